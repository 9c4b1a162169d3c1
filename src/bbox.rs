use crate::shape::Shape;
use opencv::core::Rect;
use std::marker::PhantomData;

pub trait BBoxFormat: std::fmt::Debug {}

/// Left-top-width-height format, contains left top corner and width-height
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ltwh;
impl BBoxFormat for Ltwh {}

/// Left-top-right-bottom format, contains left top and right bottom corners
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ltrb;
impl BBoxFormat for Ltrb {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox<F: BBoxFormat>([f32; 4], PhantomData<F>);

impl BBox<Ltwh> {
    #[inline]
    pub fn ltwh(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox([x1, x2, x3, x4], Default::default())
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.0[3]
    }

    /// Integer rectangle covering this box.
    pub fn to_rect(&self) -> Rect {
        let left = self.left().floor() as i32;
        let top = self.top().floor() as i32;
        let right = (self.left() + self.width()).ceil() as i32;
        let bottom = (self.top() + self.height()).ceil() as i32;

        Rect::new(left, top, (right - left).max(0), (bottom - top).max(0))
    }
}

impl BBox<Ltrb> {
    #[inline]
    pub fn ltrb(x1: f32, x2: f32, x3: f32, x4: f32) -> Self {
        BBox([x1, x2, x3, x4], Default::default())
    }

    /// Tight box around the landmarks of `shape`.
    pub fn around(shape: &Shape) -> Option<Self> {
        let (min, max) = shape.bounds()?;

        Some(Self::ltrb(
            min.x as f32,
            min.y as f32,
            max.x as f32,
            max.y as f32,
        ))
    }

    #[inline]
    pub fn as_ltwh(&self) -> BBox<Ltwh> {
        self.into()
    }

    #[inline(always)]
    pub fn left(&self) -> f32 {
        self.0[0]
    }

    #[inline(always)]
    pub fn top(&self) -> f32 {
        self.0[1]
    }

    #[inline(always)]
    pub fn right(&self) -> f32 {
        self.0[2]
    }

    #[inline(always)]
    pub fn bottom(&self) -> f32 {
        self.0[3]
    }

    /// Grows every side by `margin` times the box size.
    pub fn grow(&self, margin: f32) -> Self {
        let dw = (self.right() - self.left()) * margin;
        let dh = (self.bottom() - self.top()) * margin;

        Self::ltrb(
            self.left() - dw,
            self.top() - dh,
            self.right() + dw,
            self.bottom() + dh,
        )
    }

    /// Intersection with a `width`x`height` frame; `None` when nothing is left.
    pub fn clamp(&self, width: i32, height: i32) -> Option<Self> {
        let (w, h) = (width as f32, height as f32);
        let clamped = Self::ltrb(
            self.left().clamp(0.0, w),
            self.top().clamp(0.0, h),
            self.right().clamp(0.0, w),
            self.bottom().clamp(0.0, h),
        );

        if clamped.right() - clamped.left() < 1.0 || clamped.bottom() - clamped.top() < 1.0 {
            None
        } else {
            Some(clamped)
        }
    }
}

impl<'a> From<&'a BBox<Ltrb>> for BBox<Ltwh> {
    #[inline]
    fn from(v: &'a BBox<Ltrb>) -> Self {
        Self::ltwh(v.left(), v.top(), v.right() - v.left(), v.bottom() - v.top())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra as na;

    #[test]
    fn search_window_around_shape() {
        let shape = Shape::new(vec![
            na::Point2::new(100.0, 100.0),
            na::Point2::new(200.0, 150.0),
        ]);

        let window = BBox::around(&shape).unwrap().grow(0.5);
        assert_eq!(window, BBox::ltrb(50.0, 75.0, 250.0, 175.0));

        let clamped = window.clamp(220, 160).unwrap();
        assert_eq!(clamped, BBox::ltrb(50.0, 75.0, 220.0, 160.0));

        let rect = clamped.as_ltwh().to_rect();
        assert_eq!(rect, Rect::new(50, 75, 170, 85));
    }

    #[test]
    fn clamp_outside_frame() {
        let outside = BBox::ltrb(-50.0, -50.0, -10.0, -10.0);
        assert!(outside.clamp(640, 480).is_none());
    }

    #[test]
    fn fractional_box_covers_rect() {
        let b = BBox::ltwh(10.5, 20.2, 29.0, 39.6);
        assert_eq!(b.to_rect(), Rect::new(10, 20, 30, 40));
    }
}
