use time::OffsetDateTime;

/// Calendar year used to derive "years since last taught" for the year
/// filter.
pub(crate) fn current_year() -> i32 {
    OffsetDateTime::now_utc().year()
}
