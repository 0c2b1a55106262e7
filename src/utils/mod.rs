pub mod db_utils;
pub mod staff_cache;
pub mod staff_filter;
