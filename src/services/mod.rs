pub mod account_service;
pub mod account_service_impl;
pub use account_service::{AccountError, AccountService, RenameOutcome};
pub use account_service_impl::DefaultAccountService;

pub mod password;
pub use password::{Argon2PasswordHasher, HashError, PasswordHasher};

pub mod token;
pub use token::{Claims, JwtTokenIssuer, TokenError, TokenIssuer};

pub mod user_store;
pub use user_store::{InMemoryUserStore, StoreError, UserStore};
