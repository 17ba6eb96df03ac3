use std::fmt::{Display, Error, Formatter};
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Sub, SubAssign};

use num::{Bounded, Num, Signed};

use crate::geometry::{Vector2, Vector3};

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Point2<T> {
    pub x: T,
    pub y: T,
}

impl<T> Point2<T>
where
    T: Num + Copy,
{
    pub fn new(x: T, y: T) -> Point2<T> {
        Point2 { x, y }
    }
}

impl<T> Add<Vector2<T>> for Point2<T>
where
    T: Add<Output = T>,
{
    type Output = Point2<T>;
    fn add(self, rhs: Vector2<T>) -> Point2<T> {
        Point2 { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl<T> Sub<Point2<T>> for Point2<T>
where
    T: Sub<Output = T>,
{
    type Output = Vector2<T>;
    fn sub(self, rhs: Point2<T>) -> Vector2<T> {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl<T> Sub<Vector2<T>> for Point2<T>
where
    T: Sub<Output = T>,
{
    type Output = Point2<T>;
    fn sub(self, rhs: Vector2<T>) -> Point2<T> {
        Point2 { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl<T> Mul<T> for Point2<T>
where
    T: Mul<Output = T> + Copy,
{
    type Output = Point2<T>;
    fn mul(self, rhs: T) -> Point2<T> {
        Point2 { x: self.x * rhs, y: self.y * rhs }
    }
}

impl<T> Index<usize> for Point2<T> {
    type Output = T;
    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("Invalid index into Point2"),
        }
    }
}

impl<T> Display for Point2<T>
where
    T: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

impl From<Point2<i32>> for Point2<f32> {
    fn from(p: Point2<i32>) -> Point2<f32> {
        Point2::new(p.x as f32, p.y as f32)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Point3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T> Point3<T>
where
    T: Num + Copy,
{
    pub fn new(x: T, y: T, z: T) -> Point3<T> {
        Point3 { x, y, z }
    }
}

impl<T> Point3<T>
where
    T: Signed + Copy,
{
    pub fn abs(&self) -> Point3<T> {
        Point3::new(self.x.abs(), self.y.abs(), self.z.abs())
    }
}

impl Point3<f32> {
    pub fn distance(&self, p: &Point3<f32>) -> f32 {
        (*self - *p).length()
    }

    pub fn distance_squared(&self, p: &Point3<f32>) -> f32 {
        (*self - *p).length_squared()
    }
}

impl<T> Add<Vector3<T>> for Point3<T>
where
    T: Add<Output = T>,
{
    type Output = Point3<T>;
    fn add(self, rhs: Vector3<T>) -> Point3<T> {
        Point3 { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z }
    }
}

impl<T> AddAssign<Vector3<T>> for Point3<T>
where
    T: AddAssign,
{
    fn add_assign(&mut self, rhs: Vector3<T>) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl<T> Add<Point3<T>> for Point3<T>
where
    T: Add<Output = T>,
{
    type Output = Point3<T>;
    fn add(self, rhs: Point3<T>) -> Point3<T> {
        Point3 { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z }
    }
}

impl<T> Sub<Point3<T>> for Point3<T>
where
    T: Sub<Output = T>,
{
    type Output = Vector3<T>;
    fn sub(self, rhs: Point3<T>) -> Vector3<T> {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl<T> Sub<Vector3<T>> for Point3<T>
where
    T: Sub<Output = T>,
{
    type Output = Point3<T>;
    fn sub(self, rhs: Vector3<T>) -> Point3<T> {
        Point3 { x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z }
    }
}

impl<T> SubAssign<Vector3<T>> for Point3<T>
where
    T: SubAssign,
{
    fn sub_assign(&mut self, rhs: Vector3<T>) {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl<T> Mul<T> for Point3<T>
where
    T: Mul<Output = T> + Copy,
{
    type Output = Point3<T>;
    fn mul(self, rhs: T) -> Point3<T> {
        Point3 { x: self.x * rhs, y: self.y * rhs, z: self.z * rhs }
    }
}

impl<T> Div<T> for Point3<T>
where
    T: Div<Output = T> + Copy,
{
    type Output = Point3<T>;
    fn div(self, rhs: T) -> Point3<T> {
        Point3 { x: self.x / rhs, y: self.y / rhs, z: self.z / rhs }
    }
}

impl<T> Index<usize> for Point3<T> {
    type Output = T;
    fn index(&self, i: usize) -> &T {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Invalid index into Point3"),
        }
    }
}

impl<T> IndexMut<usize> for Point3<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Invalid index into Point3"),
        }
    }
}

impl<T> Bounded for Point3<T>
where
    T: Bounded + Num + Copy,
{
    fn min_value() -> Point3<T> {
        Point3::new(T::min_value(), T::min_value(), T::min_value())
    }

    fn max_value() -> Point3<T> {
        Point3::new(T::max_value(), T::max_value(), T::max_value())
    }
}

impl<T> Display for Point3<T>
where
    T: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

impl From<Point3<i32>> for Point3<f32> {
    fn from(p: Point3<i32>) -> Point3<f32> {
        Point3::new(p.x as f32, p.y as f32, p.z as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_vector_roundtrip() {
        let p = Point3::new(1.0f32, 2.0, 3.0);
        let v = Vector3::new(0.5f32, -1.0, 2.0);
        assert_eq!((p + v) - v, p);
    }
}
