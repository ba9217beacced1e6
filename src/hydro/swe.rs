use std::ops::{Add, Sub, Mul};




/// Number of conserved fields per grid point: height and momentum density.
pub const NUM_FIELDS: usize = 2;




// ============================================================================
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Conserved(pub f64, pub f64);

#[derive(Clone, Copy, Debug)]
pub struct ShallowWater {
    gravity: f64,
}




// ============================================================================
impl ShallowWater {

    pub fn new(gravity: f64) -> Self {
        Self { gravity }
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /**
     * Return the flux vector `(hu, hu^2 / h + g h^2 / 2)`, or `None` if the
     * height is exactly zero and the momentum flux is undefined.
     */
    pub fn flux_vector(&self, u: &Conserved) -> Option<Conserved> {
        let h = u.height();
        let hu = u.momentum();

        if h == 0.0 {
            None
        } else {
            Some(Conserved(hu, hu * hu / h + 0.5 * self.gravity * h * h))
        }
    }
}




// ============================================================================
impl Conserved {

    pub fn from_slice(cons: &[f64]) -> Self {
        Self(cons[0], cons[1])
    }

    pub fn write_to_slice(&self, cons: &mut [f64]) {
        cons[0] = self.0;
        cons[1] = self.1;
    }

    pub fn height(&self) -> f64 {
        self.0
    }

    pub fn momentum(&self) -> f64 {
        self.1
    }

    pub fn velocity(&self) -> f64 {
        self.1 / self.0
    }
}

impl From<&[f64]> for Conserved {
    fn from(slice: &[f64]) -> Self {
        Self::from_slice(slice)
    }
}




// ============================================================================
impl Add<Conserved> for Conserved {
    type Output = Self;
    fn add(self, u: Self) -> Self {
        Self(self.0 + u.0, self.1 + u.1)
    }
}

impl Sub<Conserved> for Conserved {
    type Output = Self;
    fn sub(self, u: Self) -> Self {
        Self(self.0 - u.0, self.1 - u.1)
    }
}

impl Mul<f64> for Conserved {
    type Output = Self;
    fn mul(self, a: f64) -> Self {
        Self(self.0 * a, self.1 * a)
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{Conserved, ShallowWater};

    #[test]
    fn flux_of_still_water_is_hydrostatic() {
        let swe = ShallowWater::new(9.81);
        let f = swe.flux_vector(&Conserved(2.0, 0.0)).unwrap();
        assert_eq!(f, Conserved(0.0, 0.5 * 9.81 * 4.0));
    }

    #[test]
    fn flux_is_undefined_for_zero_height() {
        let swe = ShallowWater::new(9.81);
        assert!(swe.flux_vector(&Conserved(0.0, 1.0)).is_none());
        assert!(swe.flux_vector(&Conserved(-0.0, 0.0)).is_none());
    }

    #[test]
    fn slice_round_trip_preserves_fields() {
        let mut buffer = [0.0; 2];
        Conserved(1.5, -0.25).write_to_slice(&mut buffer);
        assert_eq!(Conserved::from(&buffer[..]), Conserved(1.5, -0.25));
    }
}
