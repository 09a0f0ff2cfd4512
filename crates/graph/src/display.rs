use once_cell::sync::Lazy;
use std::collections::HashMap;

static DISPLAY_NAMES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("aws:s3/bucket:Bucket", "S3 Bucket"),
        ("aws:s3/bucketV2:BucketV2", "S3 Bucket"),
        ("aws:ec2/instance:Instance", "EC2 Instance"),
        ("aws:ec2/vpc:Vpc", "VPC"),
        ("aws:ec2/subnet:Subnet", "Subnet"),
        ("aws:ec2/securityGroup:SecurityGroup", "Security Group"),
        ("aws:ec2/internetGateway:InternetGateway", "Internet Gateway"),
        ("aws:ec2/routeTable:RouteTable", "Route Table"),
        ("aws:ec2/routeTableAssociation:RouteTableAssociation", "Route Table Assoc."),
        ("aws:ec2/eip:Eip", "Elastic IP"),
        ("aws:ec2/natGateway:NatGateway", "NAT Gateway"),
        ("aws:rds/instance:Instance", "RDS Instance"),
        ("aws:rds/cluster:Cluster", "RDS Cluster"),
        ("aws:rds/subnetGroup:SubnetGroup", "DB Subnet Group"),
        ("aws:elasticache/cluster:Cluster", "ElastiCache Cluster"),
        ("aws:elasticache/replicationGroup:ReplicationGroup", "Redis Cluster"),
        ("aws:elasticache/subnetGroup:SubnetGroup", "Cache Subnet Group"),
        ("aws:lambda/function:Function", "Lambda Function"),
        ("aws:apigateway/restApi:RestApi", "API Gateway"),
        ("aws:apigatewayv2/api:Api", "HTTP API"),
        ("aws:ecs/cluster:Cluster", "ECS Cluster"),
        ("aws:ecs/service:Service", "ECS Service"),
        ("aws:ecs/taskDefinition:TaskDefinition", "Task Definition"),
        ("aws:ecr/repository:Repository", "ECR Repo"),
        ("aws:cloudfront/distribution:Distribution", "CloudFront CDN"),
        ("aws:route53/zone:Zone", "Route53 Zone"),
        ("aws:route53/record:Record", "DNS Record"),
        ("aws:iam/role:Role", "IAM Role"),
        ("aws:iam/policy:Policy", "IAM Policy"),
        ("aws:iam/rolePolicyAttachment:RolePolicyAttachment", "Policy Attach"),
        ("aws:lb/loadBalancer:LoadBalancer", "Load Balancer"),
        ("aws:lb/targetGroup:TargetGroup", "Target Group"),
        ("aws:lb/listener:Listener", "LB Listener"),
        ("aws:alb/loadBalancer:LoadBalancer", "ALB"),
        ("aws:sns/topic:Topic", "SNS Topic"),
        ("aws:sqs/queue:Queue", "SQS Queue"),
        ("aws:dynamodb/table:Table", "DynamoDB Table"),
        ("aws:cognito/userPool:UserPool", "Cognito User Pool"),
    ])
});

/// Human-readable short label for a resource type.
///
/// Falls back to the last `:`-delimited segment of the type, then to the
/// raw type string.
pub fn short_type_for(resource_type: &str) -> String {
    if let Some(name) = DISPLAY_NAMES.get(resource_type) {
        return (*name).to_string();
    }
    resource_type
        .rsplit(':')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(resource_type)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_type_uses_display_table() {
        assert_eq!(short_type_for("aws:ec2/natGateway:NatGateway"), "NAT Gateway");
    }

    #[test]
    fn test_unknown_type_falls_back_to_last_segment() {
        assert_eq!(short_type_for("aws:kinesis/stream:Stream"), "Stream");
    }

    #[test]
    fn test_segmentless_type_falls_back_to_raw() {
        assert_eq!(short_type_for("customresource"), "customresource");
    }
}
