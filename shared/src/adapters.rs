use crate::core::{InternetGateway, RegionBinder, RegionSource, Subnet, Vpc, VpcResources};
use crate::error::SweepError;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ec2::config::Region;
use aws_sdk_ec2::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_ec2::types::Filter;
use aws_sdk_ec2::Client;

/// Lists regions through the account's bootstrap EC2 client. Construction
/// fails when the loaded config resolves no region at all, since
/// `DescribeRegions` itself needs a region to be dispatched against.
#[derive(Debug, Clone)]
pub struct Ec2RegionSource {
    client: Client,
}

impl Ec2RegionSource {
    pub fn from_config(config: &SdkConfig) -> Result<Self, SweepError> {
        if config.region().is_none() {
            return Err(SweepError::Configuration);
        }
        Ok(Self {
            client: Client::new(config),
        })
    }
}

#[async_trait]
impl RegionSource for Ec2RegionSource {
    async fn list_regions(&self) -> Result<Vec<String>, SweepError> {
        let response = self
            .client
            .describe_regions()
            .send()
            .await
            .map_err(|e| SweepError::Authorization {
                message: format!("{}", DisplayErrorContext(&e)),
            })?;

        Ok(response
            .regions()
            .iter()
            .filter_map(|region| region.region_name().map(str::to_string))
            .collect())
    }
}

/// EC2 operations bound to one region.
#[derive(Debug, Clone)]
pub struct Ec2VpcResources {
    region: String,
    client: Client,
}

impl Ec2VpcResources {
    pub fn new(region: String, client: Client) -> Self {
        Self { region, client }
    }
}

#[async_trait]
impl VpcResources for Ec2VpcResources {
    async fn list_default_vpcs(&self) -> Result<Vec<Vpc>, SweepError> {
        let response = self
            .client
            .describe_vpcs()
            .filters(Filter::builder().name("isDefault").values("true").build())
            .send()
            .await
            .map_err(|e| SweepError::Api {
                region: self.region.clone(),
                message: format!("{}", DisplayErrorContext(&e)),
            })?;

        Ok(response
            .vpcs()
            .iter()
            .filter_map(|vpc| {
                vpc.vpc_id().map(|id| Vpc {
                    id: id.to_string(),
                    is_default: vpc.is_default().unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn list_attached_gateways(
        &self,
        vpc_id: &str,
    ) -> Result<Vec<InternetGateway>, SweepError> {
        let response = self
            .client
            .describe_internet_gateways()
            .filters(
                Filter::builder()
                    .name("attachment.vpc-id")
                    .values(vpc_id)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| SweepError::Api {
                region: self.region.clone(),
                message: format!("{}", DisplayErrorContext(&e)),
            })?;

        Ok(response
            .internet_gateways()
            .iter()
            .filter_map(|gateway| {
                gateway.internet_gateway_id().map(|id| InternetGateway {
                    id: id.to_string(),
                })
            })
            .collect())
    }

    async fn detach_gateway(&self, gateway_id: &str, vpc_id: &str) -> Result<(), SweepError> {
        // Detaching an already-detached gateway is a client error on the
        // provider side and propagates; see DESIGN.md.
        self.client
            .detach_internet_gateway()
            .internet_gateway_id(gateway_id)
            .vpc_id(vpc_id)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| SweepError::DetachFailure {
                region: self.region.clone(),
                gateway_id: gateway_id.to_string(),
                vpc_id: vpc_id.to_string(),
                message: format!("{}", DisplayErrorContext(&e)),
            })
    }

    async fn list_subnets(&self, vpc_id: &str) -> Result<Vec<Subnet>, SweepError> {
        let response = self
            .client
            .describe_subnets()
            .filters(Filter::builder().name("vpc-id").values(vpc_id).build())
            .send()
            .await
            .map_err(|e| SweepError::Api {
                region: self.region.clone(),
                message: format!("{}", DisplayErrorContext(&e)),
            })?;

        Ok(response
            .subnets()
            .iter()
            .filter_map(|subnet| {
                subnet.subnet_id().map(|id| Subnet {
                    id: id.to_string(),
                })
            })
            .collect())
    }

    async fn delete_subnet(&self, subnet_id: &str) -> Result<(), SweepError> {
        self.client
            .delete_subnet()
            .subnet_id(subnet_id)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| SweepError::DeleteFailure {
                region: self.region.clone(),
                resource_id: subnet_id.to_string(),
                message: format!("{}", DisplayErrorContext(&e)),
            })
    }

    async fn delete_vpc(&self, vpc_id: &str) -> Result<(), SweepError> {
        self.client
            .delete_vpc()
            .vpc_id(vpc_id)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| {
                let message = format!("{}", DisplayErrorContext(&e));
                if e.code() == Some("DependencyViolation") {
                    SweepError::DependencyExists {
                        region: self.region.clone(),
                        vpc_id: vpc_id.to_string(),
                        message,
                    }
                } else {
                    SweepError::DeleteFailure {
                        region: self.region.clone(),
                        resource_id: vpc_id.to_string(),
                        message,
                    }
                }
            })
    }
}

/// Builds per-region clients off a single shared [`SdkConfig`], so
/// credentials, timeouts, and the HTTP client are resolved once for the
/// whole run.
#[derive(Debug)]
pub struct Ec2RegionBinder {
    base: SdkConfig,
}

impl Ec2RegionBinder {
    pub fn new(base: SdkConfig) -> Self {
        Self { base }
    }
}

impl RegionBinder for Ec2RegionBinder {
    type Client = Ec2VpcResources;

    fn bind(&self, region: &str) -> Ec2VpcResources {
        tracing::debug!(region = %region, "binding EC2 client");
        let config = aws_sdk_ec2::config::Builder::from(&self.base)
            .region(Region::new(region.to_string()))
            .build();
        Ec2VpcResources::new(region.to_string(), Client::from_conf(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_without_region_is_a_configuration_error() {
        let config = SdkConfig::builder().build();

        let result = Ec2RegionSource::from_config(&config);

        assert!(matches!(result, Err(SweepError::Configuration)));
    }

    #[test]
    fn bootstrap_with_region_succeeds() {
        let config = SdkConfig::builder()
            .region(Region::new("us-east-1"))
            .build();

        assert!(Ec2RegionSource::from_config(&config).is_ok());
    }

    #[test]
    fn binder_scopes_the_client_to_the_requested_region() {
        let config = SdkConfig::builder()
            .region(Region::new("us-east-1"))
            .build();

        let client = Ec2RegionBinder::new(config).bind("eu-north-1");

        assert_eq!(client.region, "eu-north-1");
    }
}
