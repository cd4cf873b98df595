//! Read-only checks against a live AWS account. These never delete
//! anything; run them explicitly with
//! `cargo test -p integration-tests -- --ignored` and real credentials.

use shared::adapters::{Ec2RegionBinder, Ec2RegionSource};
use shared::core::{RegionBinder, RegionSource, VpcResources};

#[ignore]
#[tokio::test]
async fn lists_regions_with_live_credentials() {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let source = Ec2RegionSource::from_config(&config).expect("no region configured");

    let regions = source.list_regions().await.expect("DescribeRegions failed");

    assert!(!regions.is_empty());
    assert!(regions.iter().all(|region| !region.is_empty()));
}

#[ignore]
#[tokio::test]
async fn default_vpc_query_matches_raw_describe_vpcs() {
    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let region = config
        .region()
        .expect("no region configured")
        .to_string();

    let client = Ec2RegionBinder::new(config.clone()).bind(&region);
    let vpcs = client.list_default_vpcs().await.expect("DescribeVpcs failed");
    for vpc in &vpcs {
        assert!(vpc.is_default, "{} is not a default VPC", vpc.id);
    }

    // The adapter must see exactly what an unfiltered-by-us raw query with
    // the same isDefault filter sees.
    let raw = aws_sdk_ec2::Client::new(&config)
        .describe_vpcs()
        .filters(
            aws_sdk_ec2::types::Filter::builder()
                .name("isDefault")
                .values("true")
                .build(),
        )
        .send()
        .await
        .expect("raw DescribeVpcs failed");

    let raw_ids: Vec<&str> = raw
        .vpcs()
        .iter()
        .filter_map(|vpc| vpc.vpc_id())
        .collect();
    let adapter_ids: Vec<&str> = vpcs.iter().map(|vpc| vpc.id.as_str()).collect();

    assert_eq!(adapter_ids, raw_ids);
}
