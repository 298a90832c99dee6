mod token;

pub use token::cmd_verify_token;
