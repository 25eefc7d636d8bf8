//! Problem codes and messages shared by every stage of the generator.
//!
//! The enumeration is generated by the build script from
//! `resources/problem-codes.csv`.

include!(concat!(env!("OUT_DIR"), "/problems.rs"));

#[cfg(test)]
mod tests {
    use super::Problem;

    #[test]
    fn code_when_nesting_too_deep_then_stable_code() {
        assert_eq!("P0104", Problem::NestingTooDeep.code());
    }

    #[test]
    fn message_when_marker_start_missing_then_describes_marker() {
        assert!(Problem::MarkerStartMissing.message().contains("start"));
    }
}
