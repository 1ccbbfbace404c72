//! Application error taxonomy.
//!
//! Every failure the engine can produce is one [`AppError`] carrying exactly
//! one [`ErrorKind`]. The kind determines the error's category, machine code,
//! default HTTP status, and bilingual user-facing message through exhaustive
//! compile-time matches; nothing here is mutable at runtime.
//!
//! The developer-facing `message` and the `context` map are diagnostics for
//! logs and tests. Only `user_message` is ever shown to end users.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad grouping of error kinds, used for dispatch and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    Validation,
    Network,
    Api,
    Auth,
    ProfitCalculation,
    Cart,
    Unknown,
}

/// Closed set of failure causes.
///
/// Adding a variant requires updating `category`, `code`, `http_status`,
/// and `user_message`; the compiler enforces exhaustiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    // Validation
    RequiredFieldMissing,
    InvalidEmail,
    InvalidPassword,
    NegativeNumber,
    InvalidInteger,
    InvalidImageUrl,
    ValueOutOfRange,

    // Network
    ConnectionFailed,
    NetworkTimeout,

    // Api
    NotFound,
    RateLimitExceeded,
    InternalServerError,
    ApiUnavailable,

    // Auth
    Unauthorized,
    TokenExpired,

    // Profit calculation
    CostGreaterThanPrice,
    InvalidProfitCalculation,
    InsufficientData,
    DegenerateSeries,

    // Cart
    InvalidQuantity,

    // Fallback
    Unknown,
}

impl ErrorKind {
    /// Category this kind belongs to.
    #[must_use]
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::RequiredFieldMissing
            | Self::InvalidEmail
            | Self::InvalidPassword
            | Self::NegativeNumber
            | Self::InvalidInteger
            | Self::InvalidImageUrl
            | Self::ValueOutOfRange => ErrorCategory::Validation,
            Self::ConnectionFailed | Self::NetworkTimeout => ErrorCategory::Network,
            Self::NotFound
            | Self::RateLimitExceeded
            | Self::InternalServerError
            | Self::ApiUnavailable => ErrorCategory::Api,
            Self::Unauthorized | Self::TokenExpired => ErrorCategory::Auth,
            Self::CostGreaterThanPrice
            | Self::InvalidProfitCalculation
            | Self::InsufficientData
            | Self::DegenerateSeries => ErrorCategory::ProfitCalculation,
            Self::InvalidQuantity => ErrorCategory::Cart,
            Self::Unknown => ErrorCategory::Unknown,
        }
    }

    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::RequiredFieldMissing => "VALIDATION_REQUIRED",
            Self::InvalidEmail => "VALIDATION_EMAIL",
            Self::InvalidPassword => "VALIDATION_PASSWORD",
            Self::NegativeNumber => "VALIDATION_NEGATIVE_NUMBER",
            Self::InvalidInteger => "VALIDATION_INTEGER",
            Self::InvalidImageUrl => "VALIDATION_IMAGE_URL",
            Self::ValueOutOfRange => "VALIDATION_RANGE",
            Self::ConnectionFailed => "NETWORK_CONNECTION_FAILED",
            Self::NetworkTimeout => "NETWORK_TIMEOUT",
            Self::NotFound => "API_NOT_FOUND",
            Self::RateLimitExceeded => "API_RATE_LIMIT",
            Self::InternalServerError => "API_INTERNAL_ERROR",
            Self::ApiUnavailable => "API_UNAVAILABLE",
            Self::Unauthorized => "AUTH_UNAUTHORIZED",
            Self::TokenExpired => "AUTH_TOKEN_EXPIRED",
            Self::CostGreaterThanPrice => "PROFIT_COST_EXCEEDS_PRICE",
            Self::InvalidProfitCalculation => "PROFIT_INVALID_CALCULATION",
            Self::InsufficientData => "PROFIT_INSUFFICIENT_DATA",
            Self::DegenerateSeries => "PROFIT_DEGENERATE_SERIES",
            Self::InvalidQuantity => "CART_INVALID_QUANTITY",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Default HTTP status for the transport layer. `0` means the failure
    /// happened before any HTTP exchange (transport error, timeout).
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::RequiredFieldMissing
            | Self::InvalidEmail
            | Self::InvalidPassword
            | Self::NegativeNumber
            | Self::InvalidInteger
            | Self::InvalidImageUrl
            | Self::ValueOutOfRange
            | Self::InvalidQuantity => 400,
            Self::ConnectionFailed | Self::NetworkTimeout => 0,
            Self::NotFound => 404,
            Self::RateLimitExceeded => 429,
            Self::InternalServerError => 500,
            Self::ApiUnavailable => 503,
            Self::Unauthorized => 401,
            Self::TokenExpired => 403,
            Self::CostGreaterThanPrice
            | Self::InvalidProfitCalculation
            | Self::InsufficientData
            | Self::DegenerateSeries => 422,
            Self::Unknown => 500,
        }
    }

    /// Ready-to-display user message in English and Japanese.
    #[must_use]
    pub const fn user_message(self) -> BilingualMessage {
        match self {
            Self::RequiredFieldMissing => BilingualMessage {
                en: "This field is required.",
                ja: "この項目は必須です。",
            },
            Self::InvalidEmail => BilingualMessage {
                en: "Please enter a valid email address.",
                ja: "有効なメールアドレスを入力してください。",
            },
            Self::InvalidPassword => BilingualMessage {
                en: "Password does not meet the requirements.",
                ja: "パスワードが要件を満たしていません。",
            },
            Self::NegativeNumber => BilingualMessage {
                en: "Please enter a number of zero or greater.",
                ja: "0以上の数値を入力してください。",
            },
            Self::InvalidInteger => BilingualMessage {
                en: "Please enter a whole number.",
                ja: "整数を入力してください。",
            },
            Self::InvalidImageUrl => BilingualMessage {
                en: "Please enter a valid image URL.",
                ja: "有効な画像URLを入力してください。",
            },
            Self::ValueOutOfRange => BilingualMessage {
                en: "The value is outside the allowed range.",
                ja: "値が許容範囲外です。",
            },
            Self::ConnectionFailed => BilingualMessage {
                en: "Could not connect to the server. Check your network connection.",
                ja: "サーバーに接続できませんでした。ネットワーク接続を確認してください。",
            },
            Self::NetworkTimeout => BilingualMessage {
                en: "The request timed out. Please try again.",
                ja: "リクエストがタイムアウトしました。もう一度お試しください。",
            },
            Self::NotFound => BilingualMessage {
                en: "The requested resource was not found.",
                ja: "お探しのリソースが見つかりませんでした。",
            },
            Self::RateLimitExceeded => BilingualMessage {
                en: "Too many requests. Please wait a moment and try again.",
                ja: "リクエストが多すぎます。しばらく待ってから再試行してください。",
            },
            Self::InternalServerError => BilingualMessage {
                en: "A server error occurred. Please try again later.",
                ja: "サーバーエラーが発生しました。しばらくしてから再試行してください。",
            },
            Self::ApiUnavailable => BilingualMessage {
                en: "The service is temporarily unavailable.",
                ja: "サービスは一時的に利用できません。",
            },
            Self::Unauthorized => BilingualMessage {
                en: "Please log in to continue.",
                ja: "続行するにはログインしてください。",
            },
            Self::TokenExpired => BilingualMessage {
                en: "Your session has expired. Please log in again.",
                ja: "セッションの有効期限が切れました。再度ログインしてください。",
            },
            Self::CostGreaterThanPrice => BilingualMessage {
                en: "Cost must be lower than the selling price.",
                ja: "仕入れ価格は販売価格より低くしてください。",
            },
            Self::InvalidProfitCalculation => BilingualMessage {
                en: "The profit calculation could not be completed.",
                ja: "利益計算を完了できませんでした。",
            },
            Self::InsufficientData => BilingualMessage {
                en: "Not enough price data for analysis.",
                ja: "分析に十分な価格データがありません。",
            },
            Self::DegenerateSeries => BilingualMessage {
                en: "The price series contains zero prices and cannot be analyzed.",
                ja: "価格データに0が含まれているため分析できません。",
            },
            Self::InvalidQuantity => BilingualMessage {
                en: "Please enter a quantity of 1 or more.",
                ja: "数量は1以上を入力してください。",
            },
            Self::Unknown => BilingualMessage {
                en: "An unexpected error occurred.",
                ja: "予期しないエラーが発生しました。",
            },
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// User-facing message pair. The caller picks the language to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BilingualMessage {
    pub en: &'static str,
    pub ja: &'static str,
}

/// A value attached to an error's diagnostic context.
///
/// Closed on purpose: tests assert on specific keys and values, so the
/// context is never an opaque blob. Never place secrets here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Bool(bool),
    Num(Decimal),
    Str(String),
}

impl From<bool> for ContextValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Decimal> for ContextValue {
    fn from(v: Decimal) -> Self {
        Self::Num(v)
    }
}

impl From<i64> for ContextValue {
    fn from(v: i64) -> Self {
        Self::Num(Decimal::from(v))
    }
}

impl From<usize> for ContextValue {
    fn from(v: usize) -> Self {
        Self::Num(Decimal::from(v as u64))
    }
}

impl From<u16> for ContextValue {
    fn from(v: u16) -> Self {
        Self::Num(Decimal::from(v))
    }
}

impl From<&str> for ContextValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// One occurrence of a failure.
///
/// Immutable once constructed; the `with_*` builders consume and return the
/// value before it is handed to a caller.
#[derive(Debug, Clone, Error, Serialize)]
#[error("[{kind}] {message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    user_message: BilingualMessage,
    http_status: u16,
    context: BTreeMap<String, ContextValue>,
    occurred_at: DateTime<Utc>,
}

impl AppError {
    /// Create an error of the given kind with its default status and
    /// user message.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.code().to_string(),
            user_message: kind.user_message(),
            http_status: kind.http_status(),
            context: BTreeMap::new(),
            occurred_at: Utc::now(),
        }
    }

    /// Replace the developer-facing message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a diagnostic key/value pair.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Override the HTTP status (passthrough for unmapped upstream codes).
    #[must_use]
    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = status;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn user_message(&self) -> BilingualMessage {
        self.user_message
    }

    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.http_status
    }

    #[must_use]
    pub const fn context(&self) -> &BTreeMap<String, ContextValue> {
        &self.context
    }

    /// Look up one context value by key.
    #[must_use]
    pub fn context_value(&self, key: &str) -> Option<&ContextValue> {
        self.context.get(key)
    }

    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Validation failure for a named field.
#[must_use]
pub fn validation_error(kind: ErrorKind, field: &str) -> AppError {
    debug_assert!(matches!(kind.category(), ErrorCategory::Validation));
    AppError::new(kind)
        .with_message(format!("validation failed for field '{field}'"))
        .with_context("field", field)
}

/// Network-level failure (no HTTP exchange completed).
#[must_use]
pub fn network_error(kind: ErrorKind, detail: &str) -> AppError {
    debug_assert!(matches!(kind.category(), ErrorCategory::Network));
    AppError::new(kind).with_message(detail.to_string())
}

/// Upstream API failure with an explicit status code.
#[must_use]
pub fn api_error(kind: ErrorKind, http_status: u16) -> AppError {
    debug_assert!(matches!(kind.category(), ErrorCategory::Api));
    AppError::new(kind)
        .with_http_status(http_status)
        .with_context("status", http_status)
}

/// Authentication or session failure.
#[must_use]
pub fn auth_error(kind: ErrorKind) -> AppError {
    debug_assert!(matches!(kind.category(), ErrorCategory::Auth));
    AppError::new(kind)
}

/// Profitability or price-analysis failure.
#[must_use]
pub fn profit_error(kind: ErrorKind) -> AppError {
    debug_assert!(matches!(kind.category(), ErrorCategory::ProfitCalculation));
    AppError::new(kind)
}

/// Cart business-rule failure.
#[must_use]
pub fn cart_error(kind: ErrorKind) -> AppError {
    debug_assert!(matches!(kind.category(), ErrorCategory::Cart));
    AppError::new(kind)
}

/// A failure observed by the transport layer that supplies the engine's
/// inputs, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExternalFailure {
    /// Connectivity failure: DNS, refused connection, broken pipe.
    Transport { detail: String },
    /// The request deadline elapsed before a response arrived.
    Timeout { detail: String },
    /// A response arrived with a non-success status.
    Status { status: u16, detail: Option<String> },
    /// The request never produced a response object.
    NoResponse { detail: Option<String> },
}

/// Normalize an externally-observed failure into one [`AppError`].
///
/// Total: every input maps to a variant, with `Unknown` as the fallback.
#[must_use]
pub fn parse_external_failure(raw: &ExternalFailure) -> AppError {
    match raw {
        ExternalFailure::Transport { detail } => {
            network_error(ErrorKind::ConnectionFailed, detail)
        }
        ExternalFailure::Timeout { detail } => network_error(ErrorKind::NetworkTimeout, detail),
        ExternalFailure::Status { status, detail } => {
            let err = match status {
                401 => auth_error(ErrorKind::Unauthorized),
                403 => auth_error(ErrorKind::TokenExpired),
                404 => api_error(ErrorKind::NotFound, 404),
                429 => api_error(ErrorKind::RateLimitExceeded, 429),
                500 => api_error(ErrorKind::InternalServerError, 500),
                other => api_error(ErrorKind::ApiUnavailable, *other),
            };
            match detail {
                Some(d) => err.with_message(d.clone()),
                None => err,
            }
        }
        ExternalFailure::NoResponse { detail } => {
            let err = AppError::new(ErrorKind::Unknown);
            match detail {
                Some(d) => err.with_message(d.clone()),
                None => err,
            }
        }
    }
}
