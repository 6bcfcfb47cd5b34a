/// prepayment - pay a weekly loan off early, then undo it
use installment_loan_rs::Loan;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut loan = Loan::from_json_str(
        r#"{
            "principal": 20000,
            "interest_rate": 0.0599,
            "term_in_months": 60,
            "disbursement_date": "2022-12-12",
            "frequency": "W",
            "fees_pct": 0.1,
            "additional_payments": {"3": 500, "4": 400, "6": 200}
        }"#,
    )?;

    println!("{} weekly payments of {}", loan.periods(), loan.scheduled_payment().round_dp(2));

    let payoff = loan.prepay_fully(10)?;
    println!("payoff at period 10: {}", payoff.round_dp(2));
    println!("repaid in {} periods, interest saved {}", loan.mod_maturity_period(), loan.interest_savings().round_dp(2));

    // the loan is closed to further changes
    if let Err(e) = loan.prepay_fully(12) {
        println!("rejected: {e}");
    }

    loan.reset_additional_payments();
    println!("after reset: fully prepaid = {}", loan.is_fully_prepaid());

    for event in loan.take_events() {
        println!("{event:?}");
    }

    Ok(())
}
