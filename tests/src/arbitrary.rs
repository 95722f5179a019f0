use proptest::prelude::*;

pub fn finite_f64() -> impl Strategy<Value = f64> {
    use prop::num::f64::*;
    POSITIVE | NEGATIVE | NORMAL | SUBNORMAL | ZERO
}

pub fn finite_f32() -> impl Strategy<Value = f32> {
    use prop::num::f32::*;
    POSITIVE | NEGATIVE | NORMAL | SUBNORMAL | ZERO
}

pub fn finite_f64_vec() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(finite_f64(), 0..8)
}

pub fn finite_f32_vec() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(finite_f32(), 0..8)
}
