#![forbid(unsafe_code)]

mod build_url;
mod client;
mod client_defaults;
mod codec;
mod credential;
mod error;
mod models;
mod session;

pub use client::{ConsoleClient, ConsoleClientBuilder, UnauthorizedHook};
pub use client_defaults::{BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_CREDENTIAL_HEADER};
pub use credential::CredentialStore;
pub use error::{Error, RequestFailure};

pub use codec::{
    decode_credential, encode_credential, join_members, merge_rate_limit, merge_retry_backoff,
    merge_retry_count, parse_optional_count, parse_optional_number, split_members,
    ApiJsonField, ApisResource, AuthResource, ConfigResource, GroupsResource, RateLimitField,
    RateLimitScope, ResourceCodec, SchedulesResource,
};

pub use models::{
    Ack, ApiEntry, AuthCredential, AuthEntry, ConfigForm, GroupRow, GroupSlot, GroupTable,
    GroupsForm, RateLimit, ResourceKind, RetryPolicy, RetrySetting, ScheduleEntry, API_METHODS,
    DEFAULT_API_KEY_HEADER, DEFAULT_API_PORT, DEFAULT_CRON, DEFAULT_RETRY_STATUSES,
    DEFAULT_TIMEOUT_SECONDS, MEDIA_SOURCES, RESPONSE_TYPES,
};

pub use session::{
    ApisSession, AuthSession, Collection, ConfigSession, EditSession, Editable, GroupsSession,
    Phase, SchedulesSession, Scratch,
};
