use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;

use bondcalc_core::fixed_income::schedule::{generate_cash_flow_schedule, ScheduleInput};
use bondcalc_core::fixed_income::valuation::{calculate_bond_with_config, BondInput, ValuationConfig};
use bondcalc_core::fixed_income::yields::{calculate_current_yield, CurrentYieldInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Bond terms plus the optional settlement date and engine options a host
/// may send alongside them.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct BondBindingInput {
    #[serde(flatten)]
    input: BondInput,
    #[serde(default)]
    settlement_date: Option<NaiveDate>,
    #[serde(default)]
    config: ValuationConfig,
}

/// Full valuation. `settlementDate` defaults to the host's current local date.
#[napi]
pub fn calculate_bond(input_json: String) -> NapiResult<String> {
    let binding_input: BondBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let settlement = binding_input
        .settlement_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let output = calculate_bond_with_config(&binding_input.input, settlement, &binding_input.config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn cash_flow_schedule(input_json: String) -> NapiResult<String> {
    let input: ScheduleInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = generate_cash_flow_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn current_yield(input_json: String) -> NapiResult<String> {
    let input: CurrentYieldInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = calculate_current_yield(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
