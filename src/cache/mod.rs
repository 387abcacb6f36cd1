//! Cache de tokens OAuth2.
//!
//! Este módulo implementa o cache por client id que evita uma troca de
//! credenciais a cada chamada de API: um token é reutilizado enquanto
//! `now < expires_at`.

mod token;

pub use token::{CacheStats, CachedToken, TokenCache, TOKEN_EXPIRE_BUFFER_SECS};
