pub mod level_select;
pub mod menu;
pub mod question_area;
pub mod score_panel;
pub mod self_check;
pub mod timer_bar;
