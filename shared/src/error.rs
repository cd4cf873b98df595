use thiserror::Error;

/// Failures a sweep can run into. Configuration and Authorization are fatal
/// to the whole run; everything else is scoped to a single region's teardown.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("unable to resolve an AWS region for the bootstrap client")]
    Configuration,

    #[error("AWS request was not authorized: {message}")]
    Authorization { message: String },

    #[error("failed to detach internet gateway {gateway_id} from {vpc_id} in {region}: {message}")]
    DetachFailure {
        region: String,
        gateway_id: String,
        vpc_id: String,
        message: String,
    },

    #[error("failed to delete {resource_id} in {region}: {message}")]
    DeleteFailure {
        region: String,
        resource_id: String,
        message: String,
    },

    #[error("VPC {vpc_id} in {region} still has attached dependents: {message}")]
    DependencyExists {
        region: String,
        vpc_id: String,
        message: String,
    },

    #[error("EC2 query failed in {region}: {message}")]
    Api { region: String, message: String },
}
