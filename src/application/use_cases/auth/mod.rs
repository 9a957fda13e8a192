pub mod get_account;
pub mod login;
pub mod register;
pub mod request_password_reset;
pub mod reset_password;
pub mod update_account;
