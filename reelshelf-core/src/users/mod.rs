pub mod model;
pub mod requests;
pub mod service;

pub use model::{NewUser, PublicProfile, User, UserCredentials, UserRole};
pub use requests::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest,
    UpdateProfileRequest, ValidationError,
};
pub use service::UserService;
