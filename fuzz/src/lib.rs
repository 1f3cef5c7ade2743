extern crate bitcoin;
extern crate paychan;

pub mod utils;

pub mod classify_close_target;
pub mod state_idx_target;
