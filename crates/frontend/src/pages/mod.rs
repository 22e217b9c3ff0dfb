pub mod opinions;
pub mod tour_map;
