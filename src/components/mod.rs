pub mod match_list;
pub mod standings;
