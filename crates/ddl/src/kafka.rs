//! Kafka connections
//!
//! [`KafkaConnectionSpec`] is the raw block an operator declares: every
//! field optional, some of them mutually exclusive. [`KafkaConnectionSpec::resolve`]
//! turns it into a [`KafkaConnection`] whose broker routing is a single
//! tagged variant, so conflicting clauses cannot be rendered.

use crate::error::{Error, Result};
use crate::name::{ObjectDescriptor, ObjectKind, ObjectReference};
use crate::quote::quote_string;
use crate::statement::Statements;
use crate::value::{SecretValue, ValueSecretSpec, resolve_optional};
use serde::{Deserialize, Serialize};

/// Accepted `SECURITY PROTOCOL` values
pub const SECURITY_PROTOCOLS: [&str; 4] = ["PLAINTEXT", "SSL", "SASL_PLAINTEXT", "SASL_SSL"];

/// Accepted `SASL MECHANISMS` values
pub const SASL_MECHANISMS: [&str; 3] = ["PLAIN", "SCRAM-SHA-256", "SCRAM-SHA-512"];

/// Case-insensitive lookup in a constant table, returning the canonical spelling.
fn lookup(table: &[&'static str], value: &str, what: &str) -> Result<&'static str> {
    table
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(value.trim()))
        .ok_or_else(|| {
            Error::invalid(format!(
                "unsupported {what} '{value}', expected one of: {}",
                table.join(", ")
            ))
        })
}

// ============================================================================
// Raw configuration
// ============================================================================

/// One `kafka_broker` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaBrokerSpec {
    /// `host:port`
    pub broker: String,
    #[serde(default)]
    pub target_group_port: Option<u16>,
    #[serde(default)]
    pub availability_zone: Option<String>,
    #[serde(default)]
    pub privatelink_connection: Option<ObjectReference>,
    #[serde(default)]
    pub ssh_tunnel: Option<ObjectReference>,
}

impl KafkaBrokerSpec {
    pub fn new(broker: impl Into<String>) -> Self {
        Self {
            broker: broker.into(),
            ..Default::default()
        }
    }

    fn resolve(&self) -> Result<KafkaBroker> {
        let address = self.broker.clone();
        let privatelink = ObjectReference::configured(
            self.privatelink_connection.as_ref(),
            "privatelink_connection",
        )?;
        let tunnel = ObjectReference::configured(self.ssh_tunnel.as_ref(), "ssh_tunnel")?;
        let zone = self
            .availability_zone
            .as_deref()
            .filter(|zone| !zone.is_empty());

        // Private link needs all three fields; anything less is a plain broker.
        let complete_privatelink = match (self.target_group_port, zone, privatelink) {
            (Some(port), Some(zone), Some(connection)) if port != 0 => {
                Some(KafkaBroker::PrivateLink {
                    address: address.clone(),
                    target_group_port: port,
                    availability_zone: zone.to_string(),
                    connection,
                })
            }
            _ => None,
        };

        match (complete_privatelink, tunnel) {
            (Some(_), Some(_)) => Err(Error::conflict(
                "kafka_broker",
                format!("broker '{address}' sets both a PrivateLink connection and an SSH tunnel"),
            )),
            (Some(broker), None) => Ok(broker),
            (None, Some(tunnel)) => Ok(KafkaBroker::SshTunnel { address, tunnel }),
            (None, None) => Ok(KafkaBroker::Direct { address }),
        }
    }
}

/// Connection-level `aws_privatelink` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsPrivateLinkSpec {
    pub privatelink_connection: ObjectReference,
    pub privatelink_connection_port: u16,
}

/// Raw Kafka connection block as declared by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaConnectionSpec {
    pub name: String,
    #[serde(default)]
    pub schema_name: String,
    #[serde(default)]
    pub database_name: String,
    #[serde(default)]
    pub kafka_broker: Vec<KafkaBrokerSpec>,
    #[serde(default)]
    pub aws_privatelink: Option<AwsPrivateLinkSpec>,
    #[serde(default)]
    pub security_protocol: Option<String>,
    #[serde(default)]
    pub progress_topic: Option<String>,
    #[serde(default)]
    pub ssl_certificate_authority: Option<ValueSecretSpec>,
    #[serde(default)]
    pub ssl_certificate: Option<ValueSecretSpec>,
    #[serde(default)]
    pub ssl_key: Option<ObjectReference>,
    #[serde(default)]
    pub sasl_mechanisms: Option<String>,
    #[serde(default)]
    pub sasl_username: Option<ValueSecretSpec>,
    #[serde(default)]
    pub sasl_password: Option<ObjectReference>,
    /// Default SSH tunnel; routes every broker through it when set
    #[serde(default)]
    pub ssh_tunnel: Option<ObjectReference>,
    #[serde(default = "default_validate")]
    pub validate: bool,
}

fn default_validate() -> bool {
    true
}

impl Default for KafkaConnectionSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            schema_name: String::new(),
            database_name: String::new(),
            kafka_broker: Vec::new(),
            aws_privatelink: None,
            security_protocol: None,
            progress_topic: None,
            ssl_certificate_authority: None,
            ssl_certificate: None,
            ssl_key: None,
            sasl_mechanisms: None,
            sasl_username: None,
            sasl_password: None,
            ssh_tunnel: None,
            validate: default_validate(),
        }
    }
}

impl KafkaConnectionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Resolve every multi-shape field to exactly one representation.
    pub fn resolve(&self) -> Result<KafkaConnection> {
        let object = ObjectDescriptor::new(
            ObjectKind::Connection,
            self.name.clone(),
            self.schema_name.clone(),
            self.database_name.clone(),
        )?;

        let routing = self.resolve_routing()?;

        let security_protocol = self
            .security_protocol
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| lookup(&SECURITY_PROTOCOLS, p, "security protocol"))
            .transpose()?;
        let sasl_mechanism = self
            .sasl_mechanisms
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(|m| lookup(&SASL_MECHANISMS, m, "SASL mechanism"))
            .transpose()?;

        let sasl_username = resolve_optional(self.sasl_username.as_ref(), "sasl_username")?;
        let sasl_password =
            ObjectReference::configured(self.sasl_password.as_ref(), "sasl_password")?;
        if sasl_mechanism.is_some() && (sasl_username.is_none() || sasl_password.is_none()) {
            return Err(Error::invalid(
                "sasl_mechanisms requires both sasl_username and sasl_password",
            ));
        }

        Ok(KafkaConnection {
            object,
            routing,
            security_protocol,
            progress_topic: self
                .progress_topic
                .clone()
                .filter(|topic| !topic.is_empty()),
            ssl_certificate_authority: resolve_optional(
                self.ssl_certificate_authority.as_ref(),
                "ssl_certificate_authority",
            )?,
            ssl_certificate: resolve_optional(self.ssl_certificate.as_ref(), "ssl_certificate")?,
            ssl_key: ObjectReference::configured(self.ssl_key.as_ref(), "ssl_key")?,
            sasl_mechanism,
            sasl_username,
            sasl_password,
            validate: self.validate,
        })
    }

    fn resolve_routing(&self) -> Result<BrokerRouting> {
        let tunnel = ObjectReference::configured(self.ssh_tunnel.as_ref(), "ssh_tunnel")?;
        let privatelink = self
            .aws_privatelink
            .as_ref()
            .map(|block| {
                let connection = ObjectReference::configured(
                    Some(&block.privatelink_connection),
                    "aws_privatelink",
                )?
                .ok_or_else(|| Error::invalid("aws_privatelink requires privatelink_connection"))?;
                if block.privatelink_connection_port == 0 {
                    return Err(Error::invalid(
                        "aws_privatelink requires privatelink_connection_port",
                    ));
                }
                Ok(AwsPrivateLink {
                    connection,
                    port: block.privatelink_connection_port,
                })
            })
            .transpose()?;

        if let Some(broker) = self.kafka_broker.iter().find(|b| b.broker.is_empty()) {
            return Err(Error::invalid(format!(
                "kafka_broker entries need a broker address (got {broker:?})"
            )));
        }

        match (self.kafka_broker.is_empty(), privatelink) {
            (false, Some(_)) => Err(Error::conflict(
                "kafka_broker",
                "kafka_broker and aws_privatelink are mutually exclusive",
            )),
            (true, None) => Err(Error::invalid(
                "one of kafka_broker or aws_privatelink is required",
            )),
            (true, Some(_)) if tunnel.is_some() => Err(Error::conflict(
                "ssh_tunnel",
                "a default SSH tunnel cannot be combined with aws_privatelink",
            )),
            (true, Some(privatelink)) => Ok(BrokerRouting::AwsPrivateLink(privatelink)),
            (false, None) => match tunnel {
                // The connection-wide tunnel wins over every per-broker setting.
                Some(tunnel) => Ok(BrokerRouting::Tunneled {
                    tunnel,
                    addresses: self.kafka_broker.iter().map(|b| b.broker.clone()).collect(),
                }),
                None => Ok(BrokerRouting::Brokers(
                    self.kafka_broker
                        .iter()
                        .map(KafkaBrokerSpec::resolve)
                        .collect::<Result<_>>()?,
                )),
            },
        }
    }
}

// ============================================================================
// Resolved representation
// ============================================================================

/// A single broker endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KafkaBroker {
    Direct {
        address: String,
    },
    PrivateLink {
        address: String,
        target_group_port: u16,
        availability_zone: String,
        connection: ObjectReference,
    },
    SshTunnel {
        address: String,
        tunnel: ObjectReference,
    },
}

impl KafkaBroker {
    fn render(&self) -> String {
        match self {
            Self::Direct { address } => quote_string(address),
            Self::PrivateLink {
                address,
                target_group_port,
                availability_zone,
                connection,
            } => format!(
                "{} USING AWS PRIVATELINK {} (PORT {}, AVAILABILITY ZONE {})",
                quote_string(address),
                connection.qualified_name(),
                target_group_port,
                quote_string(availability_zone)
            ),
            Self::SshTunnel { address, tunnel } => tunnel_broker(address, tunnel),
        }
    }
}

fn tunnel_broker(address: &str, tunnel: &ObjectReference) -> String {
    format!(
        "{} USING SSH TUNNEL {}",
        quote_string(address),
        tunnel.qualified_name()
    )
}

/// Connection-level PrivateLink endpoint used instead of a broker list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsPrivateLink {
    pub connection: ObjectReference,
    pub port: u16,
}

/// How the connection reaches its brokers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerRouting {
    /// Each broker renders according to its own variant
    Brokers(Vec<KafkaBroker>),
    /// Every broker goes through one SSH tunnel
    Tunneled {
        tunnel: ObjectReference,
        addresses: Vec<String>,
    },
    AwsPrivateLink(AwsPrivateLink),
}

impl BrokerRouting {
    fn render(&self) -> String {
        match self {
            Self::Brokers(brokers) => format!(
                "BROKERS ({})",
                brokers
                    .iter()
                    .map(KafkaBroker::render)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::Tunneled { tunnel, addresses } => format!(
                "BROKERS ({})",
                addresses
                    .iter()
                    .map(|address| tunnel_broker(address, tunnel))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::AwsPrivateLink(link) => format!(
                "AWS PRIVATELINK {} (PORT {})",
                link.connection.qualified_name(),
                link.port
            ),
        }
    }
}

/// Fully resolved Kafka connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaConnection {
    object: ObjectDescriptor,
    routing: BrokerRouting,
    security_protocol: Option<&'static str>,
    progress_topic: Option<String>,
    ssl_certificate_authority: Option<SecretValue>,
    ssl_certificate: Option<SecretValue>,
    ssl_key: Option<ObjectReference>,
    sasl_mechanism: Option<&'static str>,
    sasl_username: Option<SecretValue>,
    sasl_password: Option<ObjectReference>,
    validate: bool,
}

impl KafkaConnection {
    pub fn routing(&self) -> &BrokerRouting {
        &self.routing
    }

    /// Options inside `TO KAFKA (...)`, in their fixed order
    fn options(&self) -> Vec<String> {
        let mut options = vec![self.routing.render()];

        if let Some(protocol) = self.security_protocol {
            options.push(format!("SECURITY PROTOCOL = {}", quote_string(protocol)));
        }
        if let Some(topic) = &self.progress_topic {
            options.push(format!("PROGRESS TOPIC {}", quote_string(topic)));
        }
        if let Some(ca) = &self.ssl_certificate_authority {
            options.push(format!("SSL CERTIFICATE AUTHORITY = {}", ca.render()));
        }
        if let Some(cert) = &self.ssl_certificate {
            options.push(format!("SSL CERTIFICATE = {}", cert.render()));
        }
        if let Some(key) = &self.ssl_key {
            options.push(format!("SSL KEY = SECRET {}", key.qualified_name()));
        }
        if let Some(mechanism) = self.sasl_mechanism {
            options.push(format!("SASL MECHANISMS = {}", quote_string(mechanism)));
        }
        if let Some(username) = &self.sasl_username {
            options.push(format!("SASL USERNAME = {}", username.render()));
        }
        if let Some(password) = &self.sasl_password {
            options.push(format!("SASL PASSWORD = SECRET {}", password.qualified_name()));
        }

        options
    }
}

impl Statements for KafkaConnection {
    fn object(&self) -> &ObjectDescriptor {
        &self.object
    }

    fn create_sql(&self) -> String {
        let mut q = format!(
            "CREATE CONNECTION {} TO KAFKA ({})",
            self.object.qualified_name(),
            self.options().join(", ")
        );
        if !self.validate {
            q.push_str(" WITH (VALIDATE = false)");
        }
        q.push(';');
        q
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sasl_plain() -> KafkaConnectionSpec {
        KafkaConnectionSpec {
            kafka_broker: vec![KafkaBrokerSpec::new("b1:9092")],
            sasl_mechanisms: Some("PLAIN".into()),
            sasl_username: Some(ValueSecretSpec::text("u")),
            sasl_password: Some(ObjectReference::new("pw_secret")),
            ..KafkaConnectionSpec::new("k1")
        }
    }

    #[test]
    fn test_create_sasl_plain() {
        let conn = sasl_plain().resolve().unwrap();
        assert_eq!(
            conn.create_sql(),
            "CREATE CONNECTION k1 TO KAFKA (BROKERS ('b1:9092'), SASL MECHANISMS = 'PLAIN', \
             SASL USERNAME = 'u', SASL PASSWORD = SECRET pw_secret);"
        );
    }

    #[test]
    fn test_drop() {
        let conn = sasl_plain().resolve().unwrap();
        assert_eq!(conn.drop_sql(), "DROP CONNECTION k1;");
    }

    #[test]
    fn test_rename() {
        let conn = KafkaConnectionSpec {
            schema_name: "sch".into(),
            database_name: "db".into(),
            ..sasl_plain()
        }
        .resolve()
        .unwrap();
        assert_eq!(
            conn.rename_sql("k2").unwrap(),
            "ALTER CONNECTION db.sch.k1 RENAME TO db.sch.k2;"
        );
    }

    #[test]
    fn test_all_clauses_in_fixed_order() {
        let spec = KafkaConnectionSpec {
            schema_name: "public".into(),
            database_name: "materialize".into(),
            kafka_broker: vec![KafkaBrokerSpec::new("b1:9092"), KafkaBrokerSpec::new("b2:9092")],
            security_protocol: Some("sasl_ssl".into()),
            progress_topic: Some("progress".into()),
            ssl_certificate_authority: Some(ValueSecretSpec::secret(
                ObjectReference::new("ca").in_schema("public").in_database("materialize"),
            )),
            ssl_certificate: Some(ValueSecretSpec::text("-----BEGIN CERT-----")),
            ssl_key: Some(ObjectReference::new("key").in_schema("public")),
            sasl_mechanisms: Some("scram-sha-256".into()),
            sasl_username: Some(ValueSecretSpec::secret(ObjectReference::new("user"))),
            sasl_password: Some(ObjectReference::new("pw")),
            validate: false,
            ..KafkaConnectionSpec::new("kafka")
        };

        assert_eq!(
            spec.resolve().unwrap().create_sql(),
            "CREATE CONNECTION materialize.public.kafka TO KAFKA (\
             BROKERS ('b1:9092', 'b2:9092'), \
             SECURITY PROTOCOL = 'SASL_SSL', \
             PROGRESS TOPIC 'progress', \
             SSL CERTIFICATE AUTHORITY = SECRET materialize.public.ca, \
             SSL CERTIFICATE = '-----BEGIN CERT-----', \
             SSL KEY = SECRET public.key, \
             SASL MECHANISMS = 'SCRAM-SHA-256', \
             SASL USERNAME = SECRET user, \
             SASL PASSWORD = SECRET pw) WITH (VALIDATE = false);"
        );
    }

    #[test]
    fn test_identical_content_identical_statement() {
        // Same logical content, fields populated in a different order.
        let mut first = KafkaConnectionSpec::new("k1");
        first.progress_topic = Some("t".into());
        first.sasl_password = Some(ObjectReference::new("pw"));
        first.kafka_broker = vec![KafkaBrokerSpec::new("b1:9092")];
        first.sasl_username = Some(ValueSecretSpec::text("u"));
        first.ssl_key = Some(ObjectReference::new("key"));
        first.sasl_mechanisms = Some("PLAIN".into());

        let mut second = KafkaConnectionSpec::new("k1");
        second.sasl_mechanisms = Some("plain".into());
        second.ssl_key = Some(ObjectReference::new("key"));
        second.sasl_username = Some(ValueSecretSpec::text("u"));
        second.kafka_broker = vec![KafkaBrokerSpec::new("b1:9092")];
        second.sasl_password = Some(ObjectReference::new("pw"));
        second.progress_topic = Some("t".into());

        assert_eq!(
            first.resolve().unwrap().create_sql(),
            second.resolve().unwrap().create_sql()
        );
    }

    #[test]
    fn test_connection_tunnel_overrides_every_broker() {
        let spec = KafkaConnectionSpec {
            kafka_broker: vec![
                KafkaBrokerSpec {
                    target_group_port: Some(9001),
                    availability_zone: Some("use1-az1".into()),
                    privatelink_connection: Some(ObjectReference::new("pl")),
                    ..KafkaBrokerSpec::new("b1:9092")
                },
                KafkaBrokerSpec {
                    ssh_tunnel: Some(ObjectReference::new("other_tunnel")),
                    ..KafkaBrokerSpec::new("b2:9092")
                },
                KafkaBrokerSpec::new("b3:9092"),
            ],
            ssh_tunnel: Some(ObjectReference::new("tunnel").in_schema("s")),
            ..KafkaConnectionSpec::new("k1")
        };

        let conn = spec.resolve().unwrap();
        assert!(matches!(conn.routing(), BrokerRouting::Tunneled { .. }));
        assert_eq!(
            conn.create_sql(),
            "CREATE CONNECTION k1 TO KAFKA (BROKERS (\
             'b1:9092' USING SSH TUNNEL s.tunnel, \
             'b2:9092' USING SSH TUNNEL s.tunnel, \
             'b3:9092' USING SSH TUNNEL s.tunnel));"
        );
    }

    #[test]
    fn test_per_broker_variants() {
        let spec = KafkaConnectionSpec {
            kafka_broker: vec![
                KafkaBrokerSpec {
                    target_group_port: Some(9001),
                    availability_zone: Some("use1-az1".into()),
                    privatelink_connection: Some(ObjectReference::new("pl").in_schema("public")),
                    ..KafkaBrokerSpec::new("b1:9092")
                },
                KafkaBrokerSpec {
                    ssh_tunnel: Some(ObjectReference::new("tunnel")),
                    ..KafkaBrokerSpec::new("b2:9092")
                },
                KafkaBrokerSpec::new("b3:9092"),
            ],
            ..KafkaConnectionSpec::new("k1")
        };

        assert_eq!(
            spec.resolve().unwrap().create_sql(),
            "CREATE CONNECTION k1 TO KAFKA (BROKERS (\
             'b1:9092' USING AWS PRIVATELINK public.pl (PORT 9001, AVAILABILITY ZONE 'use1-az1'), \
             'b2:9092' USING SSH TUNNEL tunnel, \
             'b3:9092'));"
        );
    }

    #[test]
    fn test_partial_privatelink_downgrades_to_plain() {
        let spec = KafkaConnectionSpec {
            kafka_broker: vec![
                KafkaBrokerSpec {
                    target_group_port: Some(9001),
                    availability_zone: Some("use1-az1".into()),
                    ..KafkaBrokerSpec::new("b1:9092")
                },
                KafkaBrokerSpec {
                    target_group_port: Some(9001),
                    privatelink_connection: Some(ObjectReference::new("pl")),
                    ..KafkaBrokerSpec::new("b2:9092")
                },
            ],
            ..KafkaConnectionSpec::new("k1")
        };

        let conn = spec.resolve().unwrap();
        assert_eq!(
            conn.routing(),
            &BrokerRouting::Brokers(vec![
                KafkaBroker::Direct {
                    address: "b1:9092".into()
                },
                KafkaBroker::Direct {
                    address: "b2:9092".into()
                },
            ])
        );
    }

    #[test]
    fn test_broker_with_privatelink_and_tunnel_conflicts() {
        let spec = KafkaConnectionSpec {
            kafka_broker: vec![KafkaBrokerSpec {
                target_group_port: Some(9001),
                availability_zone: Some("use1-az1".into()),
                privatelink_connection: Some(ObjectReference::new("pl")),
                ssh_tunnel: Some(ObjectReference::new("tunnel")),
                ..KafkaBrokerSpec::new("b1:9092")
            }],
            ..KafkaConnectionSpec::new("k1")
        };
        assert!(matches!(
            spec.resolve(),
            Err(Error::ConfigurationConflict { .. })
        ));
    }

    #[test]
    fn test_aws_privatelink_block() {
        let spec = KafkaConnectionSpec {
            aws_privatelink: Some(AwsPrivateLinkSpec {
                privatelink_connection: ObjectReference::new("pl").in_schema("public"),
                privatelink_connection_port: 9092,
            }),
            security_protocol: Some("PLAINTEXT".into()),
            ..KafkaConnectionSpec::new("k1")
        };
        assert_eq!(
            spec.resolve().unwrap().create_sql(),
            "CREATE CONNECTION k1 TO KAFKA (AWS PRIVATELINK public.pl (PORT 9092), \
             SECURITY PROTOCOL = 'PLAINTEXT');"
        );
    }

    #[test]
    fn test_brokers_and_aws_privatelink_conflict() {
        let spec = KafkaConnectionSpec {
            kafka_broker: vec![KafkaBrokerSpec::new("b1:9092")],
            aws_privatelink: Some(AwsPrivateLinkSpec {
                privatelink_connection: ObjectReference::new("pl"),
                privatelink_connection_port: 9092,
            }),
            ..KafkaConnectionSpec::new("k1")
        };
        assert!(matches!(
            spec.resolve(),
            Err(Error::ConfigurationConflict { ref field, .. }) if field == "kafka_broker"
        ));
    }

    #[test]
    fn test_tunnel_with_aws_privatelink_conflicts() {
        let spec = KafkaConnectionSpec {
            aws_privatelink: Some(AwsPrivateLinkSpec {
                privatelink_connection: ObjectReference::new("pl"),
                privatelink_connection_port: 9092,
            }),
            ssh_tunnel: Some(ObjectReference::new("tunnel")),
            ..KafkaConnectionSpec::new("k1")
        };
        assert!(matches!(
            spec.resolve(),
            Err(Error::ConfigurationConflict { ref field, .. }) if field == "ssh_tunnel"
        ));
    }

    #[test]
    fn test_missing_brokers_is_invalid() {
        assert!(matches!(
            KafkaConnectionSpec::new("k1").resolve(),
            Err(Error::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_empty_name_is_invalid() {
        let spec = KafkaConnectionSpec {
            name: String::new(),
            ..sasl_plain()
        };
        assert!(matches!(
            spec.resolve(),
            Err(Error::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_secret_values_never_render_both_clauses() {
        let conflicting = KafkaConnectionSpec {
            ssl_certificate: Some(ValueSecretSpec {
                text: Some("pem".into()),
                secret: Some(ObjectReference::new("cert")),
            }),
            ..sasl_plain()
        };
        assert!(matches!(
            conflicting.resolve(),
            Err(Error::ConfigurationConflict { ref field, .. }) if field == "ssl_certificate"
        ));

        let empty = KafkaConnectionSpec {
            ssl_certificate: Some(ValueSecretSpec::default()),
            ssl_certificate_authority: Some(ValueSecretSpec::text("")),
            ..sasl_plain()
        };
        let sql = empty.resolve().unwrap().create_sql();
        assert!(!sql.contains("SSL CERTIFICATE"));
    }

    #[test]
    fn test_unknown_enumerations_rejected() {
        let spec = KafkaConnectionSpec {
            security_protocol: Some("TLS".into()),
            ..sasl_plain()
        };
        assert!(spec.resolve().unwrap_err().to_string().contains("security protocol"));

        let spec = KafkaConnectionSpec {
            sasl_mechanisms: Some("GSSAPI".into()),
            ..sasl_plain()
        };
        assert!(spec.resolve().unwrap_err().to_string().contains("SASL mechanism"));
    }

    #[test]
    fn test_sasl_mechanism_requires_credentials() {
        let spec = KafkaConnectionSpec {
            sasl_password: None,
            ..sasl_plain()
        };
        assert!(matches!(
            spec.resolve(),
            Err(Error::InvalidDescriptor { .. })
        ));
    }

    #[test]
    fn test_broker_addresses_are_escaped() {
        let spec = KafkaConnectionSpec {
            kafka_broker: vec![KafkaBrokerSpec::new("b'1:9092")],
            ..KafkaConnectionSpec::new("k1")
        };
        assert_eq!(
            spec.resolve().unwrap().create_sql(),
            "CREATE CONNECTION k1 TO KAFKA (BROKERS ('b''1:9092'));"
        );
    }

    #[test]
    fn test_parse_from_toml() {
        let spec: KafkaConnectionSpec = toml::from_str(
            r#"
name = "k1"
sasl_mechanisms = "PLAIN"

[[kafka_broker]]
broker = "b1:9092"

[sasl_username]
text = "u"

[sasl_password]
name = "pw_secret"
"#,
        )
        .unwrap();

        assert!(spec.validate);
        assert_eq!(spec, sasl_plain());
    }
}
