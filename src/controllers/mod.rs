pub mod board_controller;
