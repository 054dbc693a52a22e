pub mod dispatch_due_reminders;
mod dispatch_reminder;
