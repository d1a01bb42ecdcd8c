/// Parses a decimal literal into a [`crate::Bfp`], panicking on malformed
/// input. Meant for constants and tests.
#[macro_export]
macro_rules! bfp {
    ($val:literal) => {
        ($val).parse::<$crate::math::fixed_point::Bfp>().unwrap()
    };
}
