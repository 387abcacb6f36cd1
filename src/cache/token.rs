//! Cache LRU de tokens OAuth2, chaveado por client id.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;

/// Margem de segurança (em segundos) descontada da validade informada pelo
/// servidor, para nunca retornar um token que expira em pleno voo.
pub const TOKEN_EXPIRE_BUFFER_SECS: i64 = 60;

/// Token em cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    /// Bearer token emitido pela API.
    pub token: String,

    /// Instante absoluto a partir do qual a entrada deixa de ser usável.
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Cria uma entrada a partir da validade informada pelo servidor.
    ///
    /// `expires_at = issued_at + (expires_in − 60s)`.
    pub fn new(token: impl Into<String>, expires_in_secs: i64, issued_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at: issued_at + Duration::seconds(expires_in_secs - TOKEN_EXPIRE_BUFFER_SECS),
        }
    }

    /// Verifica se a entrada está expirada no instante dado.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Estatísticas do cache.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Número atual de entradas.
    pub size: usize,

    /// Capacidade máxima.
    pub capacity: usize,

    /// Número de acertos (cache hits).
    pub hits: u64,

    /// Número de erros (cache misses).
    pub misses: u64,
}

impl CacheStats {
    /// Calcula a taxa de acerto.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Cache LRU de tokens por client id.
///
/// Entradas expiradas nunca são retornadas: são simplesmente substituídas
/// quando o mesmo client id é consultado de novo após a expiração. Escritas
/// concorrentes para a mesma chave são last-write-wins.
pub struct TokenCache {
    cache: LruCache<String, CachedToken>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TokenCache {
    /// Cria um novo cache com a capacidade dada.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(64).unwrap());
        Self {
            cache: LruCache::new(cap),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Busca um token usável para o client id no instante dado.
    ///
    /// Retorna `None` se não há entrada ou se `now >= expires_at`.
    pub fn get(&mut self, client_id: &str, now: DateTime<Utc>) -> Option<String> {
        // peek primeiro para não promover entradas expiradas no LRU
        let is_expired = self.cache.peek(client_id).map(|c| c.is_expired_at(now));

        match is_expired {
            Some(true) => {
                self.cache.pop(client_id);
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Some(false) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                self.cache.get(client_id).map(|c| c.token.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insere (ou sobrescreve) a entrada do client id.
    pub fn insert(&mut self, client_id: impl Into<String>, entry: CachedToken) {
        self.cache.put(client_id.into(), entry);
    }

    /// Consulta a entrada crua, sem tocar nas estatísticas.
    pub fn peek(&self, client_id: &str) -> Option<&CachedToken> {
        self.cache.peek(client_id)
    }

    /// Retorna estatísticas do cache.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.cache.len(),
            capacity: self.cache.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new(64)
    }
}
