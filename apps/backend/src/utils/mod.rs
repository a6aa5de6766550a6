pub mod board_code;
