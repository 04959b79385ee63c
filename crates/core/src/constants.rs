/// Average hours per year, accounting for leap years (365.25 * 24).
pub const HOURS_PER_YEAR: f64 = 8766.0;

/// Day count basis for money-weighted return discounting.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Initial guess for the money-weighted return solver (10%).
pub const XIRR_INITIAL_GUESS: f64 = 0.1;

/// Residual tolerance at which the money-weighted return solver stops.
pub const XIRR_TOLERANCE: f64 = 1e-7;

/// Iteration cap for the money-weighted return solver.
pub const XIRR_MAX_ITERATIONS: usize = 100;

/// A position with fewer units than this is treated as closed when tracking
/// the holding-since anchor.
pub const OPEN_POSITION_UNIT_THRESHOLD: i64 = 1;

/// Decimal precision for reported percentages
pub const PERCENT_PRECISION: u32 = 4;

/// Date format used by trade files and API query parameters
pub const DATE_FORMAT: &str = "%Y-%m-%d";
