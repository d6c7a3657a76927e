/// [`ClientOrderId`](id::ClientOrderId) sent as ClOrdID (11).
pub mod id;

/// [`OrderRequestOpen`](request::OrderRequestOpen) market order request.
pub mod request;
