pub mod board_dto;
