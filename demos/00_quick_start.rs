/// quick start - minimal example to get started
use installment_loan_rs::chrono::NaiveDate;
use installment_loan_rs::{AdditionalPayments, Loan, Money, PaymentFrequency, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // $20,000 over 36 months at 5.99% with a 5% origination fee
    let mut loan = Loan::builder()
        .principal(Money::from_major(20_000))
        .interest_rate(Rate::from_bps(599))
        .term_in_months(36.into())
        .disbursement_date(NaiveDate::from_ymd_opt(2022, 12, 12).ok_or("invalid date")?)
        .frequency(PaymentFrequency::Monthly)
        .fees_pct(Rate::from_percentage(5))
        .build()?;

    println!("scheduled payment: {}", loan.scheduled_payment().round_dp(2));
    println!("wal {:.2} months, apr {}", loan.org_wal(), loan.org_apr().round_dp(4));

    // pay a little extra in periods 3 to 6
    let extra: AdditionalPayments = [(3, 200), (4, 300), (5, 400), (6, 500)]
        .into_iter()
        .map(|(period, amount)| (period, Money::from_major(amount)))
        .collect();
    loan.update_additional_payments(&extra)?;

    println!(
        "with extra payments: wal {:.2} months, apr {}, repaid in {} periods",
        loan.mod_wal(),
        loan.mod_apr().round_dp(4),
        loan.mod_maturity_period()
    );

    println!("{}", loan.json()?);

    Ok(())
}
