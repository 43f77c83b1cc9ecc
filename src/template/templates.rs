//! Handlebars sources for everything sqs-tf writes

pub const MODULE_MAIN: &str = r#"resource "aws_sqs_queue" "this" {
  name                       = var.name
  fifo_queue                 = var.fifo_queue
  visibility_timeout_seconds = var.visibility_timeout_seconds
  message_retention_seconds  = var.message_retention_seconds
  max_message_size           = var.max_message_size
  delay_seconds              = var.delay_seconds
  receive_wait_time_seconds  = var.receive_wait_time_seconds

  tags = var.tags
}
"#;

pub const MODULE_VARIABLES: &str = r#"variable "name" {
  description = "Name of the SQS queue"
  type        = string
}

variable "fifo_queue" {
  description = "Whether the queue is a FIFO queue"
  type        = bool
  default     = {{defaults.fifo_queue}}
}

variable "visibility_timeout_seconds" {
  description = "Visibility timeout for the queue, in seconds"
  type        = number
  default     = {{defaults.visibility_timeout_seconds}}
}

variable "message_retention_seconds" {
  description = "How long messages are retained, in seconds"
  type        = number
  default     = {{defaults.message_retention_seconds}}
}

variable "max_message_size" {
  description = "Maximum message size, in bytes"
  type        = number
  default     = {{defaults.max_message_size}}
}

variable "delay_seconds" {
  description = "Delivery delay for new messages, in seconds"
  type        = number
  default     = {{defaults.delay_seconds}}
}

variable "receive_wait_time_seconds" {
  description = "Long polling wait time, in seconds"
  type        = number
  default     = {{defaults.receive_wait_time_seconds}}
}

variable "tags" {
  description = "Tags applied to the queue"
  type        = map(string)
  default     = {}
}
"#;

pub const MODULE_OUTPUTS: &str = r#"output "url" {
  description = "URL of the SQS queue"
  value       = aws_sqs_queue.this.url
}

output "arn" {
  description = "ARN of the SQS queue"
  value       = aws_sqs_queue.this.arn
}

output "name" {
  description = "Name of the SQS queue"
  value       = aws_sqs_queue.this.name
}
"#;

pub const MODULE_CALL: &str = r#"module "{{module_name}}" {
  source = {{hcl_string source}}

  name                       = {{hcl_string name}}
  fifo_queue                 = {{attributes.fifo_queue}}
  visibility_timeout_seconds = {{attributes.visibility_timeout_seconds}}
  message_retention_seconds  = {{attributes.message_retention_seconds}}
  max_message_size           = {{attributes.max_message_size}}
  delay_seconds              = {{attributes.delay_seconds}}
  receive_wait_time_seconds  = {{attributes.receive_wait_time_seconds}}

{{#if tags}}
  tags = {
{{#each tags}}
    {{hcl_string key}} = {{hcl_string value}}
{{/each}}
  }
{{else}}
  tags = {}
{{/if}}
}
"#;

pub const QUEUE_OUTPUTS: &str = r#"output "{{module_name}}_url" {
  value = module.{{module_name}}.url
}

output "{{module_name}}_arn" {
  value = module.{{module_name}}.arn
}
"#;
