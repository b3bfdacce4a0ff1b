//! Stock validators.
//!
//! - [`sheet`] - Header checks ([`RequireFields`], [`FieldScope`])
//! - [`row`] - Cross-field checks ([`RequireOneOf`], [`RequireTogether`])
//! - [`cell`] - Per-field checks ([`Required`], [`LocalDate`], [`Pattern`], ...)
//!
//! Cell checks other than [`Required`] treat a blank cell as "not
//! applicable" and skip it, so optional fields only fail when filled in
//! badly.

pub mod cell;
pub mod datetime;
pub mod row;
pub mod sheet;

pub use cell::{
    Boolean, CellCheck, FieldValidator, FnCellCheck, Integer, Length, LocalDate, LocalDateTime,
    Number, OneOf, Pattern, Required,
};
pub use datetime::to_chrono_format;
pub use row::{FnRowCheck, RequireOneOf, RequireTogether, RowCheck, RowRule};
pub use sheet::{FieldScope, FnSheetValidator, RequireFields};
