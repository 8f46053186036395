use super::Wide;

pub trait Zero {
    fn zero() -> Self;
}

pub trait NegativeInfinity {
    fn negative_infinity() -> Self;
}

pub trait Infinity {
    fn infinity() -> Self;
}

impl Zero for Wide {
    fn zero() -> Self {
        0
    }
}
