pub mod availability;
pub mod blocked;
pub mod work_info;
