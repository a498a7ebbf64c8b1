pub mod listing;
pub mod manage;
pub mod mine;
pub mod types;


pub use listing::{available_foods, featured_foods, food_by_id, remaining_food_by_id};
pub use manage::{add_food, cancel_request, delete_food, foods_request, update_food};
pub use mine::{manage_my_foods, my_requested_foods};
