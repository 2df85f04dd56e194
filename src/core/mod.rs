// Domain-layer modules and shared errors/models
pub mod instruction {
    pub use crate::instruction::*;
}

pub mod validator {
    pub use crate::validator::*;
}

pub mod response {
    pub use crate::response::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
