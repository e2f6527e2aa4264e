//! 传输层：带超时与重试的 HTTP 请求执行。
//!
//! Transport layer: deadline-bounded HTTP execution with sequential retry.

pub mod http;

pub use http::{
    FilePart, HttpTransport, InvokeStats, MultipartBody, RawResponse, RequestBody,
    RequestDescriptor, TransportError,
};
