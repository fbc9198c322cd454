//! Named entry points with positional string arguments.
//!
//! Maps the contract-invocation surface onto the typed operations. Every
//! result is returned as JSON; operations with nothing to report return
//! `null`.

use access_policy::{PolicyPatch, RoleCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::contract::{BiodiversityContract, OverridePatch};
use crate::error::{ContractError, Result};
use crate::specimen::{SpecimenFields, TransferNote};
use crate::update::{UpdateRequest, UPDATE_ARGUMENT_COUNT};

/// Every function name [`BiodiversityContract::invoke`] accepts.
pub const FUNCTIONS: [&str; 22] = [
    "RegisterUser",
    "RegisterCollection",
    "UpdateCollection",
    "GrantPermission",
    "Create",
    "Update",
    "SuggestUpdate",
    "ApproveTransaction",
    "DenyTransaction",
    "ApproveTransactionById",
    "DenyTransactionById",
    "ListPending",
    "Override",
    "RegisterLoan",
    "ReturnLoan",
    "RegisterGrant",
    "Query",
    "GetHistory",
    "QueryAllSpecimens",
    "UpdateTaxonClass",
    "CouchQuery",
    "GetAttribution",
];

fn arity<'a>(function: &str, args: &'a [String], expected: usize) -> Result<&'a [String]> {
    if args.len() != expected {
        return Err(ContractError::invalid(format!(
            "{function} takes {expected} arguments, got {}",
            args.len()
        )));
    }
    Ok(args)
}

fn json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

impl BiodiversityContract {
    /// Invoke an operation by name.
    pub async fn invoke(&self, function: &str, args: &[String]) -> Result<Value> {
        debug!(function = %function, args = args.len(), "Invoking contract function");

        match function {
            "RegisterUser" => {
                let a = arity(function, args, 1)?;
                self.register_user(&a[0]).await?;
                Ok(Value::Null)
            }
            "RegisterCollection" => {
                let a = arity(function, args, 15)?;
                let patch = PolicyPatch::from_positional(&a[2..])?;
                json(self.register_collection(&a[0], &a[1], &patch).await?)
            }
            "UpdateCollection" => {
                let a = arity(function, args, 15)?;
                let patch = PolicyPatch::from_positional(&a[2..])?;
                json(self.update_collection(&a[0], &a[1], &patch).await?)
            }
            "GrantPermission" => {
                let a = arity(function, args, 4)?;
                let role: RoleCode = a[3].parse()?;
                self.grant_permission(&a[0], &a[1], &a[2], role).await?;
                Ok(Value::Null)
            }
            "Create" => {
                let a = arity(function, args, 21)?;
                let fields = SpecimenFields::from_positional(&a[3..])?;
                json(self.create(&a[0], &a[1], &a[2], fields).await?)
            }
            "Update" => {
                let a = arity(function, args, UPDATE_ARGUMENT_COUNT)?;
                json(self.update(&UpdateRequest::from_arguments(a)?).await?)
            }
            "SuggestUpdate" => {
                let a = arity(function, args, UPDATE_ARGUMENT_COUNT + 1)?;
                let (update, reason) = a.split_at(UPDATE_ARGUMENT_COUNT);
                let request = UpdateRequest::from_arguments(update)?;
                json(self.suggest_update(&request, &reason[0]).await?)
            }
            "ApproveTransaction" => {
                let a = arity(function, args, 3)?;
                json(self.approve_transaction(&a[0], &a[1], &a[2]).await?)
            }
            "DenyTransaction" => {
                let a = arity(function, args, 3)?;
                json(self.deny_transaction(&a[0], &a[1], &a[2]).await?)
            }
            "ApproveTransactionById" => {
                let a = arity(function, args, 3)?;
                json(self.approve_transaction_by_id(&a[0], &a[1], &a[2]).await?)
            }
            "DenyTransactionById" => {
                let a = arity(function, args, 3)?;
                json(self.deny_transaction_by_id(&a[0], &a[1], &a[2]).await?)
            }
            "ListPending" => {
                let a = arity(function, args, 1)?;
                json(self.list_pending(&a[0]).await?)
            }
            "Override" => {
                let a = arity(function, args, 6)?;
                let patch = OverridePatch {
                    condition: a[2].clone(),
                    loans: a[3].clone(),
                    grants: a[4].clone(),
                    notes: a[5].clone(),
                };
                json(self.override_history(&a[0], &a[1], &patch).await?)
            }
            "RegisterLoan" | "ReturnLoan" | "RegisterGrant" => {
                let a = arity(function, args, 5)?;
                let note = TransferNote::new(&a[2], &a[3], &a[4]);
                let specimen = match function {
                    "RegisterLoan" => self.register_loan(&a[0], &a[1], &note).await?,
                    "ReturnLoan" => self.return_loan(&a[0], &a[1], &note).await?,
                    _ => self.register_grant(&a[0], &a[1], &note).await?,
                };
                json(specimen)
            }
            "Query" => {
                let a = arity(function, args, 2)?;
                json(self.query(&a[0], &a[1]).await?)
            }
            "GetHistory" => {
                let a = arity(function, args, 1)?;
                json(self.history(&a[0]).await?)
            }
            "QueryAllSpecimens" => {
                arity(function, args, 0)?;
                json(self.query_all_specimens().await?)
            }
            "UpdateTaxonClass" => {
                let a = arity(function, args, 4)?;
                json(self.update_taxon_class(&a[0], &a[1], &a[2], &a[3]).await?)
            }
            "CouchQuery" => {
                let a = arity(function, args, 1)?;
                json(self.rich_query(&a[0]).await?)
            }
            "GetAttribution" => {
                let a = arity(function, args, 1)?;
                json(self.attribution(&a[0]).await?)
            }
            unknown => Err(ContractError::invalid(format!(
                "unknown function {unknown}"
            ))),
        }
    }
}
