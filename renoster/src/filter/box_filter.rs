use Vector2f;
use paramset::ParamSet;
use super::Filter;

#[derive(Debug)]
pub struct BoxFilter {
    radius: Vector2f,
    inv_radius: Vector2f,
}

impl BoxFilter {
    pub fn new(radius: &Vector2f) -> BoxFilter {
        BoxFilter {
            radius: *radius,
            inv_radius: Vector2f::new(1.0 / radius.x, 1.0 / radius.y),
        }
    }

    pub fn create(ps: &mut ParamSet) -> Box<dyn Filter + Send + Sync> {
        let xw = ps.find_one_float("xwidth", 0.5);
        let yw = ps.find_one_float("ywidth", 0.5);
        Box::new(BoxFilter::new(&Vector2f::new(xw, yw)))
    }
}

impl Filter for BoxFilter {
    fn evaluate(&self, _x: f32, _y: f32) -> f32 {
        1.0
    }

    fn width(&self) -> (f32, f32) {
        (self.radius.x, self.radius.y)
    }

    fn inv_width(&self) -> (f32, f32) {
        (self.inv_radius.x, self.inv_radius.y)
    }
}
