use crate::domain_model::*;
use crate::domain_port::{PaymentPlatform, PlatformError};
use chrono::{Duration, Utc};
use nanoid::nanoid;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

fn fake_id(prefix: &str) -> String {
    format!("{}_{}", prefix, nanoid!(14, &ID_ALPHABET))
}

#[derive(Default)]
struct FakeState {
    customers: Vec<CustomerRecord>,
    accounts: HashMap<AccountId, Account>,
    payment_methods: Vec<(CustomerId, PaymentMethod)>,
    // None means unlimited
    available_balance: Option<u64>,
    fail_directory: bool,
    reject_customer_creation: bool,
}

/// In-memory stand-in for the payments platform.
///
/// Keeps customers in creation order, counts directory and creation calls,
/// and can simulate a failing directory or a limited platform balance.
#[derive(Default)]
pub struct FakePaymentPlatform {
    state: Mutex<FakeState>,
    directory_calls: AtomicUsize,
    customers_created: AtomicUsize,
}

impl FakePaymentPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a customer without going through `create_customer`.
    pub fn seed_customer(&self, user_id: Option<&UserId>) -> CustomerId {
        let id = CustomerId(fake_id("cus"));
        let metadata = user_id
            .map(|u| {
                NewCustomer {
                    user_id: u.clone(),
                    email: None,
                }
                .metadata()
            })
            .unwrap_or_default();
        self.state().customers.push(CustomerRecord {
            id: id.clone(),
            email: None,
            metadata,
        });
        id
    }

    pub fn seed_account(&self, onboarded: bool) -> AccountId {
        let id = AccountId(fake_id("acct"));
        let account = Account {
            id: id.clone(),
            email: None,
            charges_enabled: onboarded,
            payouts_enabled: onboarded,
            details_submitted: onboarded,
            requirements_due: if onboarded {
                Vec::new()
            } else {
                pending_requirements()
            },
        };
        self.state().accounts.insert(id.clone(), account);
        id
    }

    pub fn seed_card(&self, customer: &CustomerId, brand: &str, last4: &str) -> PaymentMethodId {
        let id = PaymentMethodId(fake_id("pm"));
        let method = PaymentMethod {
            id: id.clone(),
            kind: "card".to_string(),
            card: Some(CardDetails {
                brand: brand.to_string(),
                last4: last4.to_string(),
                exp_month: 12,
                exp_year: 2030,
            }),
        };
        self.state().payment_methods.push((customer.clone(), method));
        id
    }

    pub fn set_available_balance(&self, balance: Option<u64>) {
        self.state().available_balance = balance;
    }

    pub fn available_balance(&self) -> Option<u64> {
        self.state().available_balance
    }

    pub fn fail_directory(&self, fail: bool) {
        self.state().fail_directory = fail;
    }

    pub fn reject_customer_creation(&self, reject: bool) {
        self.state().reject_customer_creation = reject;
    }

    pub fn directory_calls(&self) -> usize {
        self.directory_calls.load(Ordering::SeqCst)
    }

    pub fn customers_created(&self) -> usize {
        self.customers_created.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn customer_count(&self) -> usize {
        self.state().customers.len()
    }

    fn debit(state: &mut FakeState, amount: Amount) -> Result<(), PlatformError> {
        if let Some(balance) = state.available_balance {
            if amount.get() > balance {
                return Err(PlatformError::BalanceInsufficient {
                    message: "You have insufficient available funds in your account.".to_string(),
                });
            }
            state.available_balance = Some(balance - amount.get());
        }
        Ok(())
    }
}

fn pending_requirements() -> Vec<String> {
    vec![
        "external_account".to_string(),
        "tos_acceptance.date".to_string(),
    ]
}

fn no_such(kind: &str, id: impl std::fmt::Display) -> PlatformError {
    PlatformError::NotFound {
        message: format!("No such {}: '{}'", kind, id),
    }
}

#[async_trait::async_trait]
impl PaymentPlatform for FakePaymentPlatform {
    async fn list_customers(
        &self,
        page: PageRequest,
    ) -> Result<Page<CustomerRecord>, PlatformError> {
        self.directory_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        let state = self.state();
        if state.fail_directory {
            return Err(PlatformError::Api {
                message: "An error occurred with our connection to the directory.".to_string(),
                code: None,
            });
        }

        let start = match &page.starting_after {
            Some(cursor) => {
                state
                    .customers
                    .iter()
                    .position(|c| &c.id == cursor)
                    .ok_or_else(|| no_such("customer", cursor))?
                    + 1
            }
            None => 0,
        };
        let end = (start + usize::from(page.limit)).min(state.customers.len());
        let data = state.customers.get(start..end).unwrap_or_default().to_vec();

        Ok(Page {
            data,
            has_more: end < state.customers.len(),
        })
    }

    async fn create_customer(
        &self,
        customer: NewCustomer,
    ) -> Result<CustomerRecord, PlatformError> {
        tokio::task::yield_now().await;
        let mut state = self.state();
        if state.reject_customer_creation {
            return Err(PlatformError::Authentication {
                message: "Invalid API Key provided".to_string(),
            });
        }
        let record = CustomerRecord {
            id: CustomerId(fake_id("cus")),
            email: customer.email.clone(),
            metadata: customer.metadata(),
        };
        state.customers.push(record.clone());
        self.customers_created.fetch_add(1, Ordering::SeqCst);
        Ok(record)
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, PlatformError> {
        let created = Account {
            id: AccountId(fake_id("acct")),
            email: Some(account.email),
            charges_enabled: false,
            payouts_enabled: false,
            details_submitted: false,
            requirements_due: pending_requirements(),
        };
        self.state()
            .accounts
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn retrieve_account(&self, account_id: &AccountId) -> Result<Account, PlatformError> {
        self.state()
            .accounts
            .get(account_id)
            .cloned()
            .ok_or_else(|| no_such("account", account_id))
    }

    async fn create_account_link(
        &self,
        link: NewAccountLink,
    ) -> Result<AccountLink, PlatformError> {
        if !self.state().accounts.contains_key(&link.account) {
            return Err(no_such("account", &link.account));
        }
        Ok(AccountLink {
            url: format!(
                "https://connect.example.test/setup/e/{}/{}",
                link.account,
                nanoid!(12, &ID_ALPHABET)
            ),
            expires_at: Utc::now() + Duration::seconds(300),
        })
    }

    async fn create_payment_intent(
        &self,
        intent: NewPaymentIntent,
    ) -> Result<PaymentIntent, PlatformError> {
        if let Some(destination) = &intent.destination {
            if !self.state().accounts.contains_key(destination) {
                return Err(no_such("destination", destination));
            }
        }
        let id = fake_id("pi");
        Ok(PaymentIntent {
            client_secret: format!("{}_secret_{}", id, nanoid!(16, &ID_ALPHABET)),
            id,
            amount: intent.amount.get(),
            currency: intent.currency.as_str().to_string(),
            status: "requires_payment_method".to_string(),
            customer: intent.customer,
        })
    }

    async fn create_setup_intent(
        &self,
        intent: NewSetupIntent,
    ) -> Result<SetupIntent, PlatformError> {
        let id = fake_id("seti");
        Ok(SetupIntent {
            client_secret: format!("{}_secret_{}", id, nanoid!(16, &ID_ALPHABET)),
            id,
            status: "requires_payment_method".to_string(),
            customer: intent.customer,
        })
    }

    async fn list_payment_methods(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<PaymentMethod>, PlatformError> {
        Ok(self
            .state()
            .payment_methods
            .iter()
            .filter(|(owner, _)| owner == customer_id)
            .map(|(_, method)| method.clone())
            .collect())
    }

    async fn detach_payment_method(
        &self,
        payment_method_id: &PaymentMethodId,
    ) -> Result<PaymentMethod, PlatformError> {
        let mut state = self.state();
        let index = state
            .payment_methods
            .iter()
            .position(|(_, method)| &method.id == payment_method_id)
            .ok_or_else(|| no_such("PaymentMethod", payment_method_id))?;
        Ok(state.payment_methods.remove(index).1)
    }

    async fn create_transfer(&self, transfer: NewTransfer) -> Result<Transfer, PlatformError> {
        let mut state = self.state();
        if !state.accounts.contains_key(&transfer.destination) {
            return Err(no_such("destination", &transfer.destination));
        }
        Self::debit(&mut state, transfer.amount)?;
        Ok(Transfer {
            id: fake_id("tr"),
            amount: transfer.amount.get(),
            currency: transfer.currency.as_str().to_string(),
            destination: transfer.destination,
        })
    }

    async fn create_payout(&self, payout: NewPayout) -> Result<Payout, PlatformError> {
        let mut state = self.state();
        match &payout.account {
            Some(account) if !state.accounts.contains_key(account) => {
                return Err(no_such("account", account));
            }
            Some(_) => {}
            None => Self::debit(&mut state, payout.amount)?,
        }
        Ok(Payout {
            id: fake_id("po"),
            amount: payout.amount.get(),
            currency: payout.currency.as_str().to_string(),
            status: "pending".to_string(),
            arrival_date: Some((Utc::now() + Duration::days(2)).timestamp()),
        })
    }
}
