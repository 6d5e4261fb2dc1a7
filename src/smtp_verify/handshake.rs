use super::policy::PolicyMatcher;
use super::types::{ProbeOutcome, SmtpReply};

/// Position of the probe in the SMTP dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Connecting,
    AwaitingGreeting,
    AwaitingHeloAck,
    AwaitingMailAck,
    AwaitingRcptAck,
    Closing,
    Done,
}

/// What the driver must do after feeding a reply to [`Handshake::on_reply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    Send(String),
    Conclude(ProbeOutcome),
    /// 421/450/451: abandon this attempt and schedule another one.
    Retry,
    /// 550 carrying a policy-block signature.
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReplyClass {
    Positive,
    Transient,
    MailboxRejected,
    PolicyBlocked,
    Unexpected,
}

fn classify(reply: &SmtpReply, policy: &PolicyMatcher) -> ReplyClass {
    if reply.is_positive_completion() {
        ReplyClass::Positive
    } else if reply.is_transient_failure() {
        ReplyClass::Transient
    } else if reply.code == 550 {
        if policy.is_blocked(&reply.message) {
            ReplyClass::PolicyBlocked
        } else {
            ReplyClass::MailboxRejected
        }
    } else {
        ReplyClass::Unexpected
    }
}

/// Reply-driven state machine for one connection:
/// greeting, `EHLO`, `MAIL FROM`, `RCPT TO`. The probe never speaks first.
pub(crate) struct Handshake<'a> {
    step: Step,
    helo: &'a str,
    sender: &'a str,
    recipient: &'a str,
    policy: &'a PolicyMatcher,
}

impl<'a> Handshake<'a> {
    pub(crate) fn new(
        helo: &'a str,
        sender: &'a str,
        recipient: &'a str,
        policy: &'a PolicyMatcher,
    ) -> Self {
        Self {
            step: Step::Connecting,
            helo,
            sender,
            recipient,
            policy,
        }
    }

    pub(crate) fn step(&self) -> Step {
        self.step
    }

    pub(crate) fn connected(&mut self) {
        self.step = Step::AwaitingGreeting;
    }

    pub(crate) fn finish(&mut self) {
        self.step = Step::Done;
    }

    pub(crate) fn on_reply(&mut self, reply: &SmtpReply) -> Action {
        let class = classify(reply, self.policy);
        let current = self.step;
        match class {
            ReplyClass::Positive => match current {
                Step::AwaitingGreeting => {
                    self.step = Step::AwaitingHeloAck;
                    Action::Send(format!("EHLO {}", self.helo))
                }
                Step::AwaitingHeloAck => {
                    self.step = Step::AwaitingMailAck;
                    Action::Send(format!("MAIL FROM:<{}>", self.sender))
                }
                Step::AwaitingMailAck => {
                    self.step = Step::AwaitingRcptAck;
                    Action::Send(format!("RCPT TO:<{}>", self.recipient))
                }
                Step::AwaitingRcptAck => self.conclude(ProbeOutcome::Valid),
                Step::Connecting | Step::Closing | Step::Done => {
                    self.conclude(ProbeOutcome::Undetermined)
                }
            },
            ReplyClass::Transient => {
                self.step = Step::Closing;
                Action::Retry
            }
            ReplyClass::PolicyBlocked => {
                self.step = Step::Closing;
                Action::Blocked
            }
            // Only a refusal of the recipient says something about the mailbox.
            ReplyClass::MailboxRejected if current == Step::AwaitingRcptAck => {
                self.conclude(ProbeOutcome::Invalid)
            }
            ReplyClass::MailboxRejected | ReplyClass::Unexpected => {
                self.conclude(ProbeOutcome::Undetermined)
            }
        }
    }

    fn conclude(&mut self, outcome: ProbeOutcome) -> Action {
        self.step = Step::Closing;
        Action::Conclude(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(code: u16, message: &str) -> SmtpReply {
        SmtpReply::new(code, message)
    }

    fn handshake(policy: &PolicyMatcher) -> Handshake<'_> {
        let mut hs = Handshake::new("probe.test", "me@probe.test", "user@example.com", policy);
        hs.connected();
        hs
    }

    #[test]
    fn full_acceptance_sequence() {
        let policy = PolicyMatcher::default();
        let mut hs = handshake(&policy);
        assert_eq!(hs.step(), Step::AwaitingGreeting);
        assert_eq!(
            hs.on_reply(&reply(220, "ready")),
            Action::Send("EHLO probe.test".into())
        );
        assert_eq!(
            hs.on_reply(&reply(250, "hello")),
            Action::Send("MAIL FROM:<me@probe.test>".into())
        );
        assert_eq!(
            hs.on_reply(&reply(250, "ok")),
            Action::Send("RCPT TO:<user@example.com>".into())
        );
        assert_eq!(
            hs.on_reply(&reply(250, "ok")),
            Action::Conclude(ProbeOutcome::Valid)
        );
        assert_eq!(hs.step(), Step::Closing);
        hs.finish();
        assert_eq!(hs.step(), Step::Done);
    }

    #[test]
    fn rcpt_550_is_invalid() {
        let policy = PolicyMatcher::default();
        let mut hs = handshake(&policy);
        hs.on_reply(&reply(220, "ready"));
        hs.on_reply(&reply(250, "hello"));
        hs.on_reply(&reply(250, "ok"));
        assert_eq!(
            hs.on_reply(&reply(550, "5.1.1 User unknown")),
            Action::Conclude(ProbeOutcome::Invalid)
        );
    }

    #[test]
    fn rcpt_550_with_block_signature_is_blocked() {
        let policy = PolicyMatcher::default();
        let mut hs = handshake(&policy);
        hs.on_reply(&reply(220, "ready"));
        hs.on_reply(&reply(250, "hello"));
        hs.on_reply(&reply(250, "ok"));
        assert_eq!(
            hs.on_reply(&reply(550, "5.7.1 blocked using zen.spamhaus.org")),
            Action::Blocked
        );
        assert_eq!(hs.step(), Step::Closing);
    }

    #[test]
    fn early_550_is_undetermined() {
        let policy = PolicyMatcher::default();
        let mut hs = handshake(&policy);
        hs.on_reply(&reply(220, "ready"));
        hs.on_reply(&reply(250, "hello"));
        assert_eq!(
            hs.on_reply(&reply(550, "sender rejected")),
            Action::Conclude(ProbeOutcome::Undetermined)
        );
    }

    #[test]
    fn transient_codes_retry_at_any_step() {
        let policy = PolicyMatcher::default();
        for code in [421, 450, 451] {
            let mut hs = handshake(&policy);
            assert_eq!(hs.on_reply(&reply(code, "try later")), Action::Retry);

            let mut hs = handshake(&policy);
            hs.on_reply(&reply(220, "ready"));
            hs.on_reply(&reply(250, "hello"));
            assert_eq!(hs.on_reply(&reply(code, "greylisted")), Action::Retry);
        }
    }

    #[test]
    fn other_codes_are_undetermined() {
        let policy = PolicyMatcher::default();
        for code in [354, 452, 500, 551, 553, 554] {
            let mut hs = handshake(&policy);
            hs.on_reply(&reply(220, "ready"));
            hs.on_reply(&reply(250, "hello"));
            hs.on_reply(&reply(250, "ok"));
            assert_eq!(
                hs.on_reply(&reply(code, "nope")),
                Action::Conclude(ProbeOutcome::Undetermined),
                "code {code}"
            );
        }
    }

    #[test]
    fn reply_after_conclusion_is_undetermined() {
        let policy = PolicyMatcher::none();
        let mut hs = Handshake::new("h", "s", "r", &policy);
        assert_eq!(
            hs.on_reply(&reply(220, "ready")),
            Action::Conclude(ProbeOutcome::Undetermined)
        );
    }
}
