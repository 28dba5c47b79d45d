//! What a payment buys and which gateway collected it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of product a payment fulfils.
///
/// Each kind has exactly one post-payment strategy registered at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Enrollment in a single course.
    Course,

    /// Activation of a teacher's package subscription.
    TeacherPackage,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Course => "course",
            ProductType::TeacherPackage => "teacher_package",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "course" => Some(ProductType::Course),
            "teacher_package" => Some(ProductType::TeacherPackage),
            _ => None,
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment gateway that handled the checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentGateway {
    PayOs,
}

impl PaymentGateway {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentGateway::PayOs => "payos",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "payos" => Some(PaymentGateway::PayOs),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
