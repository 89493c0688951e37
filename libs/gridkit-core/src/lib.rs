//! Pure query model for declarative list endpoints: filter expressions,
//! operator enumerations, paging plans and tree assembly. SQL generation
//! lives in `gridkit-db`; this crate carries no ORM types.

pub mod filter;
pub mod ops;
pub mod page;
pub mod request;
pub mod tree;

pub use filter::{parse_filter_expression, FilterGroup, FilterKey, OpToken, OPERATOR_DELIMITER};
pub use ops::{DatePart, FilterOp};
pub use page::{ListPage, PagePlan, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DEFAULT_SAFE_LIMIT};
pub use request::{OrderKey, PageRequest, SortDir};
pub use tree::{assemble_forest, TreeNode};
