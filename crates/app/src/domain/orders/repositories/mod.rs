mod idempotency;
mod orders;

pub(crate) use idempotency::PgIdempotencyRepository;
pub(crate) use orders::PgOrdersRepository;
