use crate::error::SweepError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "mocks"))]
use mockall::{automock, predicate::*};

/// A VPC as returned by a describe call. Only referenced for deletion,
/// never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vpc {
    pub id: String,
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternetGateway {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
}

/// Outcome of a whole run: how many default VPCs were deleted, and which
/// regions could not be fully swept.
#[derive(Debug, Default, Serialize)]
pub struct SweepReport {
    pub deleted: u32,
    pub failures: Vec<RegionFailure>,
}

#[derive(Debug, Serialize)]
pub struct RegionFailure {
    pub region: String,
    pub error: String,
}

/// Enumerates every region the caller's credentials can address.
#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait RegionSource: Send + Sync {
    async fn list_regions(&self) -> Result<Vec<String>, SweepError>;
}

/// Resource operations against a single region. Implementations are bound
/// to one region at construction; identifiers never cross regions.
#[cfg_attr(any(test, feature = "mocks"), automock)]
#[async_trait]
pub trait VpcResources: Send + Sync {
    async fn list_default_vpcs(&self) -> Result<Vec<Vpc>, SweepError>;
    async fn list_attached_gateways(
        &self,
        vpc_id: &str,
    ) -> Result<Vec<InternetGateway>, SweepError>;
    async fn detach_gateway(&self, gateway_id: &str, vpc_id: &str) -> Result<(), SweepError>;
    async fn list_subnets(&self, vpc_id: &str) -> Result<Vec<Subnet>, SweepError>;
    async fn delete_subnet(&self, subnet_id: &str) -> Result<(), SweepError>;
    async fn delete_vpc(&self, vpc_id: &str) -> Result<(), SweepError>;
}

/// Produces a [`VpcResources`] client bound to the given region.
#[cfg_attr(any(test, feature = "mocks"), automock(type Client = MockVpcResources;))]
pub trait RegionBinder: Send + Sync {
    type Client: VpcResources;

    fn bind(&self, region: &str) -> Self::Client;
}

/// Detaches every internet gateway attached to the VPC. Gateways are
/// siblings; no ordering among them is required. A single failure aborts
/// the VPC's teardown so the VPC delete is never attempted with a gateway
/// still attached.
pub async fn detach_gateways<C: VpcResources>(vpc_id: &str, client: &C) -> Result<(), SweepError> {
    for gateway in client.list_attached_gateways(vpc_id).await? {
        println!("Detaching Internet Gateway {} from {}...", gateway.id, vpc_id);
        client.detach_gateway(&gateway.id, vpc_id).await?;
    }
    Ok(())
}

/// Deletes every subnet in the VPC. Same failure policy as
/// [`detach_gateways`].
pub async fn delete_subnets<C: VpcResources>(vpc_id: &str, client: &C) -> Result<(), SweepError> {
    for subnet in client.list_subnets(vpc_id).await? {
        println!("Deleting Subnet {} from {}...", subnet.id, vpc_id);
        client.delete_subnet(&subnet.id).await?;
    }
    Ok(())
}

/// Walks a list of regions and removes each region's default VPC after
/// clearing its dependents. Regions are processed strictly one at a time;
/// a failure inside one region is recorded and the sweep moves on to the
/// next region.
#[derive(Debug)]
pub struct DefaultVpcSweeper<B: RegionBinder> {
    binder: B,
}

impl<B: RegionBinder> DefaultVpcSweeper<B> {
    pub fn new(binder: B) -> Self {
        Self { binder }
    }

    pub async fn sweep(&self, regions: &[String]) -> SweepReport {
        let mut report = SweepReport::default();

        for region in regions {
            if let Err(error) = self.sweep_region(region, &mut report).await {
                tracing::error!(region = %region, error = %error, "region sweep failed");
                report.failures.push(RegionFailure {
                    region: region.clone(),
                    error: error.to_string(),
                });
            }
        }

        report
    }

    /// Deletes counted so far stay in the report even when a later VPC in
    /// the same region fails; the reported total must equal the number of
    /// successful delete calls exactly.
    async fn sweep_region(
        &self,
        region: &str,
        report: &mut SweepReport,
    ) -> Result<(), SweepError> {
        let client = self.binder.bind(region);

        let vpcs = client.list_default_vpcs().await?;
        if vpcs.is_empty() {
            tracing::debug!(region = %region, "no default VPC");
            return Ok(());
        }

        println!("[{region}]");

        // Normally zero or one per region, but the provider is not trusted
        // on that point.
        for vpc in vpcs {
            detach_gateways(&vpc.id, &client).await?;
            delete_subnets(&vpc.id, &client).await?;

            println!("Deleting Default VPC {}...\n", vpc.id);
            client.delete_vpc(&vpc.id).await?;
            report.deleted += 1;
        }

        Ok(())
    }
}
