pub mod map_view;
pub mod opinion_detail;
pub mod opinion_feed;
pub mod opinion_form;
pub mod relay_status;
pub mod travel_form;
pub mod venue_popup;
