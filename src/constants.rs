//! Grid Constants
//!
//! Centralized defaults shared by the query layer, the table state and config.

/// Filter field the table widget uses for its global search box
pub const GLOBAL_FILTER_FIELD: &str = "global";

/// Page size used before the user picks one
pub const DEFAULT_PAGE_SIZE: usize = 3;

/// Page sizes offered by the paginator
pub const PAGE_SIZE_OPTIONS: [usize; 7] = [1, 2, 5, 10, 25, 50, 100];

/// Page size for the payments sub-list
pub const PAYMENTS_PAGE_SIZE: usize = 50;

/// Collection path of the list endpoint
pub const PATIENTS_PATH: &str = "patients";

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// HTTP request timeout
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment overrides
pub const ENV_BASE_URL: &str = "PATIENTS_API_BASE_URL";
pub const ENV_ACCESS_TOKEN: &str = "PATIENTS_ACCESS_TOKEN";

/// Date format the endpoint expects for day-granular filters
pub const CALENDAR_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date format used when displaying date cells
pub const DISPLAY_DATE_FORMAT: &str = "%m/%d/%Y";
