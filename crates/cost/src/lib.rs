//! Static monthly cost estimates per resource type.
//!
//! Two read paths with deliberately different unknown-type behavior: the
//! per-node estimate is absent when the type is unknown, while the
//! aggregate substitutes a fixed default so the planning total stays
//! conservative. The displayed aggregate can therefore exceed the sum of
//! displayed per-node values.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Aggregate fallback for resource types missing from the table.
pub const DEFAULT_MONTHLY_ESTIMATE: f64 = 5.0;

static COST_TABLE: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("aws:ec2/instance:Instance", 30.0),
        ("aws:ec2/vpc:Vpc", 0.0),
        ("aws:ec2/subnet:Subnet", 0.0),
        ("aws:ec2/securityGroup:SecurityGroup", 0.0),
        ("aws:ec2/internetGateway:InternetGateway", 0.0),
        ("aws:ec2/routeTable:RouteTable", 0.0),
        ("aws:ec2/routeTableAssociation:RouteTableAssociation", 0.0),
        ("aws:ec2/eip:Eip", 4.0),
        ("aws:ec2/natGateway:NatGateway", 45.0),
        ("aws:s3/bucket:Bucket", 3.0),
        ("aws:s3/bucketV2:BucketV2", 3.0),
        ("aws:rds/instance:Instance", 25.0),
        ("aws:rds/cluster:Cluster", 50.0),
        ("aws:rds/subnetGroup:SubnetGroup", 0.0),
        ("aws:elasticache/cluster:Cluster", 20.0),
        ("aws:elasticache/replicationGroup:ReplicationGroup", 40.0),
        ("aws:elasticache/subnetGroup:SubnetGroup", 0.0),
        ("aws:lambda/function:Function", 2.0),
        ("aws:apigateway/restApi:RestApi", 5.0),
        ("aws:apigatewayv2/api:Api", 5.0),
        ("aws:ecs/cluster:Cluster", 0.0),
        ("aws:ecs/service:Service", 30.0),
        ("aws:ecs/taskDefinition:TaskDefinition", 0.0),
        ("aws:ecr/repository:Repository", 2.0),
        ("aws:cloudfront/distribution:Distribution", 10.0),
        ("aws:route53/zone:Zone", 1.0),
        ("aws:route53/record:Record", 0.0),
        ("aws:iam/role:Role", 0.0),
        ("aws:iam/policy:Policy", 0.0),
        ("aws:iam/rolePolicyAttachment:RolePolicyAttachment", 0.0),
        ("aws:lb/loadBalancer:LoadBalancer", 20.0),
        ("aws:lb/targetGroup:TargetGroup", 0.0),
        ("aws:lb/listener:Listener", 0.0),
        ("aws:alb/loadBalancer:LoadBalancer", 20.0),
        ("aws:alb/targetGroup:TargetGroup", 0.0),
        ("aws:alb/listener:Listener", 0.0),
        ("aws:sns/topic:Topic", 1.0),
        ("aws:sqs/queue:Queue", 1.0),
        ("aws:dynamodb/table:Table", 5.0),
        ("aws:ses/emailIdentity:EmailIdentity", 0.0),
        ("aws:cognito/userPool:UserPool", 5.0),
    ])
});

/// Table lookup for a single resource type. `None` means no estimate;
/// callers must not treat it as zero.
pub fn estimate_monthly_cost(resource_type: &str) -> Option<f64> {
    COST_TABLE.get(resource_type).copied()
}

/// Conservative aggregate over a set of resource types: table value when
/// known, [`DEFAULT_MONTHLY_ESTIMATE`] otherwise.
pub fn total_estimated_cost<'a, I>(resource_types: I) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    resource_types
        .into_iter()
        .map(|ty| COST_TABLE.get(ty).copied().unwrap_or(DEFAULT_MONTHLY_ESTIMATE))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_type_has_estimate() {
        assert_eq!(estimate_monthly_cost("aws:ec2/instance:Instance"), Some(30.0));
        assert_eq!(estimate_monthly_cost("aws:ec2/vpc:Vpc"), Some(0.0));
    }

    #[test]
    fn test_unknown_type_has_no_estimate() {
        assert_eq!(estimate_monthly_cost("aws:unknownsvc/x:X"), None);
    }

    #[test]
    fn test_aggregate_defaults_unknown_types_to_five() {
        let total = total_estimated_cost(["aws:ec2/instance:Instance", "aws:unknownsvc/x:X"]);
        assert_eq!(total, 35.0);
    }

    #[test]
    fn test_aggregate_of_free_resources_is_zero() {
        let total = total_estimated_cost(["aws:ec2/vpc:Vpc", "aws:iam/role:Role"]);
        assert_eq!(total, 0.0);
    }

    #[test]
    fn test_all_estimates_are_non_negative() {
        // The node invariant allows only absent or non-negative estimates.
        for value in COST_TABLE.values() {
            assert!(*value >= 0.0);
        }
    }
}
