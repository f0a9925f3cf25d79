pub mod ancestry;
pub mod grammar;
pub mod node;
pub mod node_id_map;
pub mod position_utils;
pub mod types;
